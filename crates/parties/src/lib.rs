//! Parties (customers/suppliers) and the party balance ledger contract.

pub mod party;

pub use party::{Party, PartyKind};
