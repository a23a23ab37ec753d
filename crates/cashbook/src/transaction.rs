use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posbook_core::{CashTxId, InvoiceId, PartyId};
use posbook_invoicing::{Invoice, InvoicePayment, TransactionType};

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashFlow {
    In,
    Out,
}

impl CashFlow {
    /// Signed party balance delta for a cash movement of this direction.
    ///
    /// Collecting cash from a party reduces its receivable; paying cash out
    /// increases what is owed back (or reduces a payable). Must stay the
    /// algebraic mirror of the invoice-side convention.
    pub fn balance_delta(&self, amount: i64) -> i64 {
        match self {
            Self::In => -amount,
            Self::Out => amount,
        }
    }

    /// Direction of the cash entry an invoice payment generates.
    pub fn for_invoice(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Sale | TransactionType::PurchaseReturn => Self::In,
            TransactionType::Purchase | TransactionType::SaleReturn => Self::Out,
        }
    }
}

fn category_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Sale => "Sales",
        TransactionType::Purchase => "Purchase",
        TransactionType::SaleReturn => "Sale Return",
        TransactionType::PurchaseReturn => "Purchase Return",
    }
}

/// One cashbook entry.
///
/// Entries with `linked_invoice_id` set are owned by the invoice lifecycle:
/// the UI shows a lock instead of a delete action, and the engine refuses
/// independent deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: CashTxId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub flow: CashFlow,
    /// Amount in the smallest currency unit; always non-negative.
    pub amount: i64,
    pub category: String,
    pub description: Option<String>,
    pub party_id: Option<PartyId>,
    /// Denormalized so history survives party deletion.
    pub party_name: Option<String>,
    pub linked_invoice_id: Option<InvoiceId>,
}

impl CashTransaction {
    pub fn new(
        id: CashTxId,
        date: DateTime<Utc>,
        flow: CashFlow,
        amount: i64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            date,
            flow,
            amount,
            category: category.into(),
            description: None,
            party_id: None,
            party_name: None,
            linked_invoice_id: None,
        }
    }

    /// System-managed entry mirroring an invoice's initial payment.
    ///
    /// The id is derived deterministically from the invoice so later edits
    /// and deletes of the invoice can locate and resync exactly one entry.
    pub fn linked_to_invoice(invoice: &Invoice) -> Self {
        Self {
            id: CashTxId::for_invoice(&invoice.id),
            date: invoice.date,
            flow: CashFlow::for_invoice(invoice.kind),
            amount: invoice.received_amount,
            category: category_label(invoice.kind).to_string(),
            description: Some(format!("Invoice {}", invoice.id)),
            party_id: Some(invoice.party_id.clone()),
            party_name: Some(invoice.party_name.clone()),
            linked_invoice_id: Some(invoice.id.clone()),
        }
    }

    /// Independently-addressable entry for one additional partial payment.
    ///
    /// Linked via `linked_invoice_id` for deletion-time discovery, never
    /// resynced in place.
    pub fn payment_for_invoice(invoice: &Invoice, payment: &InvoicePayment) -> Self {
        Self {
            id: CashTxId::generate(),
            date: payment.date,
            flow: CashFlow::for_invoice(invoice.kind),
            amount: payment.amount,
            category: category_label(invoice.kind).to_string(),
            description: payment
                .note
                .clone()
                .or_else(|| Some(format!("Payment for invoice {}", invoice.id))),
            party_id: Some(invoice.party_id.clone()),
            party_name: Some(invoice.party_name.clone()),
            linked_invoice_id: Some(invoice.id.clone()),
        }
    }

    pub fn is_invoice_linked(&self) -> bool {
        self.linked_invoice_id.is_some()
    }

    /// Signed party balance delta this entry applies when recorded.
    pub fn balance_delta(&self) -> i64 {
        self.flow.balance_delta(self.amount)
    }
}
