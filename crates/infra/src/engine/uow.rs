use chrono::{DateTime, Utc};
use tracing::warn;

use posbook_catalog::Product;
use posbook_cashbook::CashTransaction;
use posbook_core::{CashTxId, InvoiceId, PartyId, ProductId};
use posbook_invoicing::Invoice;
use posbook_parties::Party;
use posbook_stock::{StockMovementType, StockTransaction};

use crate::store::{RecordStore, StorageBackend, StoreResult};

/// Staged copy of every collection an engine operation may touch.
///
/// There is no cross-collection transaction underneath, so each operation
/// computes its full multi-collection effect on these local copies and
/// flushes once at the end. Collections are committed in the fixed order
/// stock → party balance → cashbook → invoices, the same order the effects
/// are applied in. Any failure before `commit` leaves the store untouched.
pub(crate) struct UnitOfWork<'a, B: StorageBackend> {
    store: &'a RecordStore<B>,
    products: Vec<Product>,
    parties: Vec<Party>,
    stock_history: Vec<StockTransaction>,
    cashbook: Vec<CashTransaction>,
    invoices: Vec<Invoice>,
    products_dirty: bool,
    parties_dirty: bool,
    stock_dirty: bool,
    cashbook_dirty: bool,
    invoices_dirty: bool,
}

impl<'a, B: StorageBackend> UnitOfWork<'a, B> {
    pub fn load(store: &'a RecordStore<B>) -> Self {
        Self {
            store,
            products: store.products(),
            parties: store.parties(),
            stock_history: store.stock_history(),
            cashbook: store.cash_transactions(),
            invoices: store.invoices(),
            products_dirty: false,
            parties_dirty: false,
            stock_dirty: false,
            cashbook_dirty: false,
            invoices_dirty: false,
        }
    }

    pub fn commit(self) -> StoreResult<()> {
        if self.products_dirty {
            self.store.save_products(&self.products)?;
        }
        if self.stock_dirty {
            self.store.save_stock_history(&self.stock_history)?;
        }
        if self.parties_dirty {
            self.store.save_parties(&self.parties)?;
        }
        if self.cashbook_dirty {
            self.store.save_cash_transactions(&self.cashbook)?;
        }
        if self.invoices_dirty {
            self.store.save_invoices(&self.invoices)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn upsert_product(&mut self, product: Product) {
        self.products_dirty = true;
        match self.products.iter().position(|p| p.id == product.id) {
            Some(idx) => self.products[idx] = product,
            None => self.products.push(product),
        }
    }

    pub fn remove_product(&mut self, id: &ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|p| &p.id != id);
        let removed = self.products.len() != before;
        self.products_dirty |= removed;
        removed
    }

    /// Apply one signed stock movement: mutate the cached stock level and
    /// append the ledger entry explaining it. A missing product is skipped
    /// silently so historical invoices stay replayable after catalog
    /// deletions.
    pub fn apply_stock_movement(
        &mut self,
        product_id: &ProductId,
        date: DateTime<Utc>,
        movement: StockMovementType,
        signed_quantity: i64,
        note: Option<String>,
        reference_id: Option<InvoiceId>,
    ) {
        let Some(idx) = self.products.iter().position(|p| &p.id == product_id) else {
            warn!(product = %product_id, "stock movement skipped: product no longer exists");
            return;
        };

        let previous = self.products[idx].stock;
        let entry = StockTransaction::record(
            product_id.clone(),
            date,
            movement,
            signed_quantity,
            previous,
            note,
            reference_id,
        );
        self.products[idx].stock = entry.new_stock;
        if entry.new_stock < 0 {
            warn!(
                product = %product_id,
                stock = entry.new_stock,
                "stock went negative"
            );
        }

        // Newest first, matching the query contract.
        self.stock_history.insert(0, entry);
        self.products_dirty = true;
        self.stock_dirty = true;
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub fn party(&self, id: &PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| &p.id == id)
    }

    pub fn upsert_party(&mut self, party: Party) {
        self.parties_dirty = true;
        match self.parties.iter().position(|p| p.id == party.id) {
            Some(idx) => self.parties[idx] = party,
            None => self.parties.push(party),
        }
    }

    pub fn remove_party(&mut self, id: &PartyId) -> bool {
        let before = self.parties.len();
        self.parties.retain(|p| &p.id != id);
        let removed = self.parties.len() != before;
        self.parties_dirty |= removed;
        removed
    }

    /// Apply a signed balance delta. A missing party is skipped silently
    /// (untracked walk-in or a deleted party on a historical invoice).
    pub fn apply_party_delta(&mut self, party_id: &PartyId, delta: i64) {
        if delta == 0 {
            return;
        }
        let Some(idx) = self.parties.iter().position(|p| &p.id == party_id) else {
            warn!(party = %party_id, "balance delta skipped: party no longer exists");
            return;
        };
        self.parties[idx].apply_balance_delta(delta);
        self.parties_dirty = true;
    }

    // ------------------------------------------------------------------
    // Cashbook
    // ------------------------------------------------------------------

    pub fn cash_transaction(&self, id: &CashTxId) -> Option<&CashTransaction> {
        self.cashbook.iter().find(|t| &t.id == id)
    }

    /// Upsert-by-id with balance reconciliation.
    ///
    /// When the id already exists this is an update: the OLD entry's party
    /// effect is reversed first (using the old type/amount/party), the new
    /// entry replaces it, and the NEW entry's effect is applied. This
    /// double-reversal keeps the invoice-linked entry resyncable across
    /// invoice edits without drifting any balance.
    pub fn record_cash(&mut self, tx: CashTransaction) {
        if let Some(idx) = self.cashbook.iter().position(|t| t.id == tx.id) {
            let old = self.cashbook[idx].clone();
            if let Some(party_id) = &old.party_id {
                self.apply_party_delta(party_id, -old.balance_delta());
            }
            self.cashbook[idx] = tx.clone();
        } else {
            self.cashbook.insert(0, tx.clone());
        }
        if let Some(party_id) = &tx.party_id {
            self.apply_party_delta(party_id, tx.balance_delta());
        }
        self.cashbook_dirty = true;
    }

    /// Remove an entry, reversing its party effect using the stored
    /// type/amount. Returns whether anything was removed.
    pub fn delete_cash(&mut self, id: &CashTxId) -> bool {
        let Some(idx) = self.cashbook.iter().position(|t| &t.id == id) else {
            return false;
        };
        let old = self.cashbook.remove(idx);
        if let Some(party_id) = &old.party_id {
            self.apply_party_delta(party_id, -old.balance_delta());
        }
        self.cashbook_dirty = true;
        true
    }

    /// Ids of every cash entry linked to the given invoice.
    pub fn cash_linked_to_invoice(&self, invoice_id: &InvoiceId) -> Vec<CashTxId> {
        self.cashbook
            .iter()
            .filter(|t| t.linked_invoice_id.as_ref() == Some(invoice_id))
            .map(|t| t.id.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    pub fn invoice(&self, id: &InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|i| &i.id == id)
    }

    pub fn put_invoice(&mut self, invoice: Invoice) {
        self.invoices_dirty = true;
        match self.invoices.iter().position(|i| i.id == invoice.id) {
            Some(idx) => self.invoices[idx] = invoice,
            // Newest first, matching the original list ordering.
            None => self.invoices.insert(0, invoice),
        }
    }

    pub fn remove_invoice(&mut self, id: &InvoiceId) -> bool {
        let before = self.invoices.len();
        self.invoices.retain(|i| &i.id != id);
        let removed = self.invoices.len() != before;
        self.invoices_dirty |= removed;
        removed
    }
}
