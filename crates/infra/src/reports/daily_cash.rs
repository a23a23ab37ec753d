use chrono::NaiveDate;
use serde::Serialize;

use posbook_catalog::Product;
use posbook_cashbook::{CashFlow, CashTransaction};
use posbook_invoicing::{Invoice, TransactionType};

use crate::store::{RecordStore, StorageBackend};

/// One day's cash position plus the gross profit of that day's sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCashStats {
    pub cash_in: i64,
    pub cash_out: i64,
    pub net_cash: i64,
    /// Revenue minus cost over the day's sale invoices, minus their
    /// invoice-level discounts. Lines whose product no longer exists are
    /// left out of the profit figure.
    pub sales_gross_profit: i64,
}

impl DailyCashStats {
    pub fn compute(
        date: NaiveDate,
        cash: &[CashTransaction],
        invoices: &[Invoice],
        products: &[Product],
    ) -> Self {
        let day_cash = cash.iter().filter(|t| t.date.date_naive() == date);
        let mut cash_in = 0;
        let mut cash_out = 0;
        for tx in day_cash {
            match tx.flow {
                CashFlow::In => cash_in += tx.amount,
                CashFlow::Out => cash_out += tx.amount,
            }
        }

        let mut gross = 0;
        for inv in invoices
            .iter()
            .filter(|i| i.kind == TransactionType::Sale && i.date.date_naive() == date)
        {
            for item in &inv.items {
                if let Some(product) = products.iter().find(|p| p.id == item.product_id) {
                    gross += item.total - product.cost * item.quantity;
                }
            }
            gross -= inv.discount;
        }

        Self {
            cash_in,
            cash_out,
            net_cash: cash_in - cash_out,
            sales_gross_profit: gross,
        }
    }
}

pub fn daily_cash<B: StorageBackend>(store: &RecordStore<B>, date: NaiveDate) -> DailyCashStats {
    DailyCashStats::compute(
        date,
        &store.cash_transactions(),
        &store.invoices(),
        &store.products(),
    )
}
