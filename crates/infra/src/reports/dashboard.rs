use serde::Serialize;

use posbook_invoicing::{Invoice, TransactionType};
use posbook_parties::Party;

use crate::store::{RecordStore, StorageBackend};

/// Lifetime business overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Sales net of sale returns.
    pub total_sales: i64,
    /// Purchases net of purchase returns.
    pub total_purchases: i64,
    /// Sum of positive party balances.
    pub total_receivable: i64,
    /// Sum of negative party balances, as a magnitude.
    pub total_payable: i64,
    pub net_profit: i64,
}

impl DashboardStats {
    pub fn compute(invoices: &[Invoice], parties: &[Party]) -> Self {
        let mut sales = 0;
        let mut purchases = 0;
        let mut sale_returns = 0;
        let mut purchase_returns = 0;

        for inv in invoices {
            match inv.kind {
                TransactionType::Sale => sales += inv.total_amount,
                TransactionType::Purchase => purchases += inv.total_amount,
                TransactionType::SaleReturn => sale_returns += inv.total_amount,
                TransactionType::PurchaseReturn => purchase_returns += inv.total_amount,
            }
        }

        let total_receivable = parties.iter().filter(|p| p.balance > 0).map(|p| p.balance).sum();
        let total_payable = parties
            .iter()
            .filter(|p| p.balance < 0)
            .map(|p| p.balance.abs())
            .sum();

        let total_sales = sales - sale_returns;
        let total_purchases = purchases - purchase_returns;

        Self {
            total_sales,
            total_purchases,
            total_receivable,
            total_payable,
            net_profit: total_sales - total_purchases,
        }
    }
}

pub fn dashboard<B: StorageBackend>(store: &RecordStore<B>) -> DashboardStats {
    DashboardStats::compute(&store.invoices(), &store.parties())
}
