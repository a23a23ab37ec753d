//! Stock ledger: append-only log of signed stock movements per product.

pub mod movement;

pub use movement::{StockMovementType, StockTransaction};
