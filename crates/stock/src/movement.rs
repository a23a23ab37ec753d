use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posbook_core::{InvoiceId, ProductId, StockTxId};

/// Kind of stock movement.
///
/// The sign convention is fixed: entries are written with a signed
/// `quantity` and the type alone determines the sign for every kind except
/// `Adjustment`, where the caller supplies it (manual corrections and
/// "Void" reversals go both ways).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMovementType {
    /// Initial stock at product creation. (+)
    Opening,
    /// Purchase invoice or manual restock. (+)
    Purchase,
    /// Sale invoice. (−)
    Sale,
    /// Customer sent goods back. (+)
    ReturnIn,
    /// Goods sent back to a supplier. (−)
    ReturnOut,
    /// Lost or broken. (−)
    Damage,
    /// Manual correction or reversal. (±, caller-signed)
    Adjustment,
    /// Stock moved out; no symmetric "in" leg is modeled. (−)
    Transfer,
}

impl StockMovementType {
    /// Fixed sign for this movement kind, `None` for caller-signed kinds.
    pub fn direction(&self) -> Option<i64> {
        match self {
            Self::Opening | Self::Purchase | Self::ReturnIn => Some(1),
            Self::Sale | Self::ReturnOut | Self::Damage | Self::Transfer => Some(-1),
            Self::Adjustment => None,
        }
    }

    /// Resolve a caller-supplied quantity into the signed ledger quantity.
    ///
    /// Directed kinds take the magnitude and impose their own sign;
    /// `Adjustment` keeps the quantity exactly as given.
    pub fn signed_quantity(&self, quantity: i64) -> i64 {
        match self.direction() {
            Some(sign) => sign * quantity.abs(),
            None => quantity,
        }
    }
}

/// One immutable stock ledger entry.
///
/// Entries are never edited in place; corrections are appended as new
/// `Adjustment` entries so history shows the reversal as a visible event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: StockTxId,
    pub product_id: ProductId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub movement: StockMovementType,
    /// Signed: positive increases stock, negative decreases.
    pub quantity: i64,
    /// Stock snapshot before this entry was applied.
    pub previous_stock: i64,
    /// Stock snapshot after this entry was applied.
    pub new_stock: i64,
    pub note: Option<String>,
    /// Invoice that caused this movement, when any.
    pub reference_id: Option<InvoiceId>,
}

impl StockTransaction {
    /// Build an entry from an already-signed quantity and the pre-movement
    /// stock snapshot. `new_stock` is derived, keeping the two snapshots
    /// consistent by construction.
    pub fn record(
        product_id: ProductId,
        date: DateTime<Utc>,
        movement: StockMovementType,
        quantity: i64,
        previous_stock: i64,
        note: Option<String>,
        reference_id: Option<InvoiceId>,
    ) -> Self {
        Self {
            id: StockTxId::generate(),
            product_id,
            date,
            movement,
            quantity,
            previous_stock,
            new_stock: previous_stock + quantity,
            note,
            reference_id,
        }
    }
}
