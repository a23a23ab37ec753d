use serde::{Deserialize, Serialize};

use posbook_core::{DomainError, DomainResult, PartyId};

/// Party kind: customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyKind {
    Customer,
    Supplier,
}

/// Ledger record: a customer or supplier with a single running balance.
///
/// Sign convention: positive balance = the party owes the business
/// (receivable), negative = the business owes the party (payable).
///
/// The balance is a derived cache. It mutates only through the invoice
/// effects engine and the cashbook, each applying signed deltas; reverting
/// an entity applies the exact algebraic inverse of its original delta,
/// never a recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub reference_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: PartyKind,
    /// Signed running balance in the smallest currency unit.
    pub balance: i64,
}

impl Party {
    pub fn new(id: PartyId, name: impl Into<String>, phone: impl Into<String>, kind: PartyKind) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            reference_code: None,
            kind,
            balance: 0,
        }
    }

    /// The untracked walk-in customer every store starts with.
    pub fn walk_in() -> Self {
        Self::new(PartyId::new("WALK_IN"), "Walk-in Customer", "0000", PartyKind::Customer)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("party name cannot be empty"));
        }
        Ok(())
    }

    /// Apply a signed balance delta from one ledger effect.
    pub fn apply_balance_delta(&mut self, delta: i64) {
        self.balance += delta;
    }

    /// Positive balance: the party owes the business.
    pub fn is_receivable(&self) -> bool {
        self.balance > 0
    }

    /// Negative balance: the business owes the party.
    pub fn is_payable(&self) -> bool {
        self.balance < 0
    }
}
