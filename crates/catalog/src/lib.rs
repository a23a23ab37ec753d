//! Product catalog records.

pub mod product;

pub use product::{Product, DEFAULT_REORDER_LEVEL};
