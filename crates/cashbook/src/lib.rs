//! Cashbook: discretionary cash-in/cash-out events, optionally linked to an
//! invoice and/or a party.

pub mod transaction;

pub use transaction::{CashFlow, CashTransaction};
