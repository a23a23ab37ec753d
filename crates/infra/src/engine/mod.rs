//! Ledger & inventory consistency engine.
//!
//! Single write path for every operation that touches more than one
//! collection: product stock, the stock ledger, party balances, the
//! cashbook and invoices stay mutually consistent because all mutations are
//! staged in a [`uow::UnitOfWork`] and flushed in one ordered commit
//! (stock → party balance → cashbook).

mod effects;
mod uow;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use posbook_catalog::Product;
use posbook_cashbook::CashTransaction;
use posbook_core::{CashTxId, DomainError, InvoiceId, PartyId, ProductId};
use posbook_parties::Party;
use posbook_stock::{StockMovementType, StockTransaction};

use crate::store::{RecordStore, StorageBackend, StoreError};

use uow::UnitOfWork;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bulk update of an invoice with more than one recorded payment is an
    /// explicit unsupported case: such invoices are reconciled only through
    /// `add_invoice_payment`, never through update.
    #[error("invoice {0} has multiple recorded payments and cannot be bulk-updated")]
    MultiPaymentUpdate(InvoiceId),

    /// The entry is owned by an invoice lifecycle and carries a lock
    /// indicator instead of a delete action.
    #[error("cash transaction {id} is managed by invoice {invoice} and cannot be deleted independently")]
    LockedCashTransaction { id: CashTxId, invoice: InvoiceId },
}

/// The data-mutation API the UI layer talks to.
///
/// Every operation is synchronous and runs to completion before returning;
/// reads go straight to the store, writes go through a unit of work.
#[derive(Debug)]
pub struct LedgerEngine<B: StorageBackend> {
    store: RecordStore<B>,
}

impl<B: StorageBackend> LedgerEngine<B> {
    pub fn new(store: RecordStore<B>) -> Self {
        Self { store }
    }

    /// Read-only access to the underlying record store.
    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    pub(crate) fn begin(&self) -> UnitOfWork<'_, B> {
        UnitOfWork::load(&self.store)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Upsert a catalog record.
    ///
    /// Creation with nonzero stock logs an OPENING movement. On update, a
    /// changed `stock` field logs the difference as a manual ADJUSTMENT so
    /// the ledger keeps explaining every stock level (the ledger, not the
    /// cached field, is the source of truth).
    pub fn save_product(&self, product: Product) -> EngineResult<()> {
        product.validate()?;
        let mut uow = self.begin();

        match uow.product(&product.id).cloned() {
            Some(existing) => {
                let delta = product.stock - existing.stock;
                // Keep the stored level until the ledger entry books the
                // difference, so the entry's snapshots line up with history.
                let mut updated = product.clone();
                updated.stock = existing.stock;
                uow.upsert_product(updated);
                if delta != 0 {
                    uow.apply_stock_movement(
                        &product.id,
                        Utc::now(),
                        StockMovementType::Adjustment,
                        delta,
                        Some("Manual correction".to_string()),
                        None,
                    );
                }
            }
            None => {
                let opening = product.stock;
                if opening != 0 {
                    let mut created = product.clone();
                    created.stock = 0;
                    uow.upsert_product(created);
                    uow.apply_stock_movement(
                        &product.id,
                        Utc::now(),
                        StockMovementType::Opening,
                        opening,
                        Some("Opening stock".to_string()),
                        None,
                    );
                } else {
                    uow.upsert_product(product.clone());
                }
            }
        }

        info!(product = %product.id, "product saved");
        uow.commit()?;
        Ok(())
    }

    /// Remove a product. Non-cascading: historical invoices and stock
    /// entries keep their denormalized names and ids.
    pub fn delete_product(&self, id: &ProductId) -> EngineResult<()> {
        let mut uow = self.begin();
        if uow.remove_product(id) {
            info!(product = %id, "product deleted");
            uow.commit()?;
        }
        Ok(())
    }

    /// Record a manual stock movement (restock, damage, correction…).
    pub fn adjust_stock(
        &self,
        id: &ProductId,
        movement: StockMovementType,
        quantity: i64,
        note: Option<String>,
    ) -> EngineResult<()> {
        let mut uow = self.begin();
        if uow.product(id).is_none() {
            return Err(DomainError::not_found().into());
        }
        let signed = movement.signed_quantity(quantity);
        uow.apply_stock_movement(id, Utc::now(), movement, signed, note, None);
        info!(product = %id, quantity = signed, ?movement, "stock adjusted");
        uow.commit()?;
        Ok(())
    }

    /// Stock ledger, newest first, optionally filtered by product.
    pub fn stock_history(&self, product: Option<&ProductId>) -> Vec<StockTransaction> {
        let mut entries = self.store.stock_history();
        if let Some(id) = product {
            entries.retain(|e| &e.product_id == id);
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    /// Upsert a party. The running balance is engine-owned: it starts at
    /// the given value only for brand-new parties and is preserved across
    /// updates, so it can never be edited around the ledger.
    pub fn save_party(&self, mut party: Party) -> EngineResult<()> {
        party.validate()?;
        let mut uow = self.begin();
        if let Some(existing) = uow.party(&party.id) {
            party.balance = existing.balance;
        }
        uow.upsert_party(party.clone());
        info!(party = %party.id, "party saved");
        uow.commit()?;
        Ok(())
    }

    /// Remove a party. Non-cascading: historical invoices keep the
    /// denormalized name.
    pub fn delete_party(&self, id: &PartyId) -> EngineResult<()> {
        let mut uow = self.begin();
        if uow.remove_party(id) {
            info!(party = %id, "party deleted");
            uow.commit()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cashbook
    // ------------------------------------------------------------------

    /// Upsert a cash entry by id, reconciling any linked party balance.
    ///
    /// Re-recording an existing id first reverses the old entry's effect
    /// and then applies the new one, so edits never drift a balance.
    pub fn save_cash_transaction(&self, tx: CashTransaction) -> EngineResult<()> {
        let mut uow = self.begin();
        info!(cash = %tx.id, amount = tx.amount, flow = ?tx.flow, "cash transaction recorded");
        uow.record_cash(tx);
        uow.commit()?;
        Ok(())
    }

    /// Delete a user-managed cash entry, reversing its party effect.
    ///
    /// Entries linked to an invoice are owned by that invoice's lifecycle
    /// and are refused here; deleting the invoice removes them.
    pub fn delete_cash_transaction(&self, id: &CashTxId) -> EngineResult<()> {
        let mut uow = self.begin();
        let Some(tx) = uow.cash_transaction(id) else {
            warn!(cash = %id, "delete skipped: cash transaction not found");
            return Ok(());
        };
        if let Some(invoice) = &tx.linked_invoice_id {
            return Err(EngineError::LockedCashTransaction {
                id: id.clone(),
                invoice: invoice.clone(),
            });
        }
        uow.delete_cash(id);
        info!(cash = %id, "cash transaction deleted");
        uow.commit()?;
        Ok(())
    }
}
