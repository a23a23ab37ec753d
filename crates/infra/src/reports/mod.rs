//! Read-only reporting: aggregations computed from the record store at
//! read time. Holds no state of its own.

pub mod daily_cash;
pub mod dashboard;
pub mod party_ledger;
pub mod stock_levels;

pub use daily_cash::{daily_cash, DailyCashStats};
pub use dashboard::{dashboard, DashboardStats};
pub use party_ledger::{party_ledger, PartyLedgerView};
pub use stock_levels::low_stock;
