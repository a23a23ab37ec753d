use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posbook_catalog::Product;
use posbook_core::{InvoiceId, PartyId, PaymentId, ProductId};
use posbook_stock::StockMovementType;

/// Invoice transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Sale,
    Purchase,
    SaleReturn,
    PurchaseReturn,
}

impl TransactionType {
    /// Stock ledger movement kind this invoice type books per line item.
    pub fn stock_movement(&self) -> StockMovementType {
        match self {
            Self::Sale => StockMovementType::Sale,
            Self::Purchase => StockMovementType::Purchase,
            Self::SaleReturn => StockMovementType::ReturnIn,
            Self::PurchaseReturn => StockMovementType::ReturnOut,
        }
    }

    /// Signed party balance delta for an invoice of this type.
    ///
    /// The full invoice value is booked, not just the due portion: the
    /// upfront payment is recorded separately as an offsetting cash
    /// transaction, and the two effects net to the due amount.
    pub fn balance_delta(&self, total_amount: i64) -> i64 {
        match self {
            Self::Sale | Self::PurchaseReturn => total_amount,
            Self::Purchase | Self::SaleReturn => -total_amount,
        }
    }
}

/// Payment status, derived from the total and received amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Partial,
}

impl PaymentStatus {
    pub fn derive(total_amount: i64, received_amount: i64) -> Self {
        let due = (total_amount - received_amount).max(0);
        if due == 0 {
            Self::Paid
        } else if received_amount > 0 {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }
}

/// One invoice line. Product name and price are frozen at write time so
/// history stays readable after the product changes or disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    /// Flat line-level discount in the smallest currency unit.
    pub discount: i64,
    /// `price * quantity - discount`.
    pub total: i64,
}

impl InvoiceItem {
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: i64,
        price: i64,
        discount: i64,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            price,
            discount,
            total: price * quantity - discount,
        }
    }

    /// Snapshot a line from the current catalog record.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        Self::new(
            product.id.clone(),
            product.name.clone(),
            quantity,
            product.price,
            product.discount.unwrap_or(0) * quantity,
        )
    }
}

/// One discrete cash inflow/outflow against an invoice. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePayment {
    pub id: PaymentId,
    pub date: DateTime<Utc>,
    pub amount: i64,
    pub note: Option<String>,
}

impl InvoicePayment {
    pub fn new(date: DateTime<Utc>, amount: i64, note: Option<String>) -> Self {
        Self {
            id: PaymentId::generate(),
            date,
            amount,
            note,
        }
    }
}

/// Invoice record.
///
/// `subtotal`, `total_amount`, `due_amount` and `status` are derived via
/// [`Invoice::recompute_totals`]; `due_amount` is floored at zero so an
/// overpayment never produces a negative due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub date: DateTime<Utc>,
    pub party_id: PartyId,
    /// Denormalized so history survives party deletion.
    pub party_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub items: Vec<InvoiceItem>,
    pub subtotal: i64,
    /// Invoice-level flat discount in the smallest currency unit.
    pub discount: i64,
    /// `max(0, subtotal - discount)`.
    pub total_amount: i64,
    pub received_amount: i64,
    /// `max(0, total_amount - received_amount)`.
    pub due_amount: i64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub payments: Vec<InvoicePayment>,
}

impl Invoice {
    pub fn new(
        id: InvoiceId,
        date: DateTime<Utc>,
        party_id: PartyId,
        party_name: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            id,
            date,
            party_id,
            party_name: party_name.into(),
            kind,
            items: Vec::new(),
            subtotal: 0,
            discount: 0,
            total_amount: 0,
            received_amount: 0,
            due_amount: 0,
            status: PaymentStatus::Paid,
            payments: Vec::new(),
        }
    }

    /// Re-derive every computed field from items, discount and received
    /// amount. Idempotent; call after any mutation of those inputs.
    pub fn recompute_totals(&mut self) {
        self.subtotal = self.items.iter().map(|i| i.total).sum();
        self.total_amount = (self.subtotal - self.discount).max(0);
        self.due_amount = (self.total_amount - self.received_amount).max(0);
        self.status = PaymentStatus::derive(self.total_amount, self.received_amount);
    }

    /// Sum of the recorded payment history.
    pub fn total_paid(&self) -> i64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Whether the payment history fully explains `received_amount`.
    pub fn payments_reconciled(&self) -> bool {
        self.total_paid() == self.received_amount
    }

    /// Append a payment and re-derive due amount and status.
    pub fn apply_payment(&mut self, payment: InvoicePayment) {
        self.received_amount += payment.amount;
        self.payments.push(payment);
        self.due_amount = (self.total_amount - self.received_amount).max(0);
        self.status = PaymentStatus::derive(self.total_amount, self.received_amount);
    }
}
