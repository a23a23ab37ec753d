use chrono::{DateTime, Utc};
use serde::Serialize;

use posbook_core::PartyId;
use posbook_invoicing::Invoice;
use posbook_parties::Party;

use crate::store::{RecordStore, StorageBackend};

/// Per-party ledger view: the party's current position plus its invoice
/// history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyLedgerView {
    pub party: Party,
    /// Lifetime sum of invoice totals for this party.
    pub total_invoiced: i64,
    /// Lifetime sum of received amounts.
    pub total_received: i64,
    pub transaction_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    pub invoices: Vec<Invoice>,
}

impl PartyLedgerView {
    pub fn compute(party: Party, all_invoices: &[Invoice]) -> Self {
        let mut invoices: Vec<Invoice> = all_invoices
            .iter()
            .filter(|i| i.party_id == party.id)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            total_invoiced: invoices.iter().map(|i| i.total_amount).sum(),
            total_received: invoices.iter().map(|i| i.received_amount).sum(),
            transaction_count: invoices.len(),
            last_activity: invoices.first().map(|i| i.date),
            invoices,
            party,
        }
    }
}

/// `None` when the party no longer exists in the active collection.
pub fn party_ledger<B: StorageBackend>(
    store: &RecordStore<B>,
    id: &PartyId,
) -> Option<PartyLedgerView> {
    let party = store.party(id)?;
    Some(PartyLedgerView::compute(party, &store.invoices()))
}
