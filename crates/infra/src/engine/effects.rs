//! Invoice effects: the coupled stock + party-balance + cashbook side
//! effects of creating, updating, or deleting an invoice.
//!
//! Effects are always re-derived in full: update = revert old + apply new,
//! never an incremental diff. Reverts are exact algebraic inverses of the
//! stored invoice's original effect, and stock reversals are appended as
//! visible ADJUSTMENT ("Void") entries, never deletions of history.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use posbook_cashbook::CashTransaction;
use posbook_core::{CashTxId, InvoiceId};
use posbook_invoicing::{Invoice, InvoicePayment};
use posbook_stock::StockMovementType;

use crate::store::StorageBackend;

use super::uow::UnitOfWork;
use super::{EngineError, EngineResult, LedgerEngine};

impl<B: StorageBackend> LedgerEngine<B> {
    /// Create an invoice: apply its effects, then persist it.
    ///
    /// Derived fields (subtotal, total, due, status) are recomputed before
    /// applying so the booked effect always matches the stored record.
    /// Zero-item invoices and unknown parties are tolerated: they simply
    /// produce no stock or balance effect.
    pub fn create_invoice(&self, mut invoice: Invoice) -> EngineResult<()> {
        invoice.recompute_totals();
        let mut uow = self.begin();
        apply_effects(&mut uow, &mut invoice);
        info!(invoice = %invoice.id, kind = ?invoice.kind, total = invoice.total_amount, "invoice created");
        uow.put_invoice(invoice);
        uow.commit()?;
        Ok(())
    }

    /// Update an invoice: full revert of the old effects, full apply of the
    /// new ones, then cashbook reconciliation.
    ///
    /// A missing id is a silent no-op (lenient by design, logged). An
    /// invoice with more than one recorded payment is refused before any
    /// mutation: its cashbook entries can only be reconciled through
    /// [`LedgerEngine::add_invoice_payment`].
    pub fn update_invoice(&self, id: &InvoiceId, mut new_invoice: Invoice) -> EngineResult<()> {
        let mut uow = self.begin();
        let Some(old) = uow.invoice(id).cloned() else {
            warn!(invoice = %id, "update skipped: invoice not found");
            return Ok(());
        };
        if old.payments.len() > 1 {
            return Err(EngineError::MultiPaymentUpdate(id.clone()));
        }

        new_invoice.id = id.clone();
        new_invoice.recompute_totals();

        revert_effects(&mut uow, &old);
        apply_effects(&mut uow, &mut new_invoice);

        // The apply step resynced the linked cash entry via the cashbook's
        // upsert-by-id double reversal; all that remains is removing a stale
        // entry when the payment disappeared entirely.
        if new_invoice.received_amount == 0 {
            uow.delete_cash(&CashTxId::for_invoice(id));
        }

        info!(invoice = %id, "invoice updated");
        uow.put_invoice(new_invoice);
        uow.commit()?;
        Ok(())
    }

    /// Delete an invoice: revert its effects, remove every cash entry it
    /// owns (reversing each one's party effect), then drop the record.
    /// A missing id is a silent no-op (logged).
    pub fn delete_invoice(&self, id: &InvoiceId) -> EngineResult<()> {
        let mut uow = self.begin();
        let Some(invoice) = uow.invoice(id).cloned() else {
            warn!(invoice = %id, "delete skipped: invoice not found");
            return Ok(());
        };

        revert_effects(&mut uow, &invoice);

        // The deterministic entry first (legacy data may lack the back
        // link), then every entry discovered through linked_invoice_id;
        // the sweep covers additional partial payments.
        uow.delete_cash(&CashTxId::for_invoice(id));
        for cash_id in uow.cash_linked_to_invoice(id) {
            uow.delete_cash(&cash_id);
        }

        uow.remove_invoice(id);
        info!(invoice = %id, "invoice deleted");
        uow.commit()?;
        Ok(())
    }

    /// Record one additional payment against an invoice.
    ///
    /// Appends to the payment history, re-derives due amount and status,
    /// and books one new independently-id'd cash entry linked to the
    /// invoice. The original linked entry is never touched, and stock and
    /// party effects are not re-run: they were booked against the full
    /// total at creation. A missing id is a silent no-op (logged).
    pub fn add_invoice_payment(
        &self,
        id: &InvoiceId,
        amount: i64,
        date: DateTime<Utc>,
        note: Option<String>,
    ) -> EngineResult<()> {
        let mut uow = self.begin();
        let Some(mut invoice) = uow.invoice(id).cloned() else {
            warn!(invoice = %id, "payment skipped: invoice not found");
            return Ok(());
        };

        let payment = InvoicePayment::new(date, amount, note);
        let cash = CashTransaction::payment_for_invoice(&invoice, &payment);
        invoice.apply_payment(payment);

        info!(invoice = %id, amount, due = invoice.due_amount, "payment added");
        uow.put_invoice(invoice);
        uow.record_cash(cash);
        uow.commit()?;
        Ok(())
    }
}

/// Apply an invoice's full effect set, in the fixed order stock → party
/// balance → cashbook.
///
/// Takes the invoice mutably: invoices saved with an upfront amount but no
/// payment history get a single back-filled payment so the history explains
/// `received_amount`.
pub(super) fn apply_effects<B: StorageBackend>(uow: &mut UnitOfWork<'_, B>, invoice: &mut Invoice) {
    let movement = invoice.kind.stock_movement();
    for item in &invoice.items {
        uow.apply_stock_movement(
            &item.product_id,
            invoice.date,
            movement,
            movement.signed_quantity(item.quantity),
            None,
            Some(invoice.id.clone()),
        );
    }

    uow.apply_party_delta(
        &invoice.party_id,
        invoice.kind.balance_delta(invoice.total_amount),
    );

    if invoice.received_amount > 0 {
        if invoice.payments.is_empty() {
            invoice.payments.push(InvoicePayment::new(
                invoice.date,
                invoice.received_amount,
                Some("Initial payment".to_string()),
            ));
        }
        uow.record_cash(CashTransaction::linked_to_invoice(invoice));
    }
}

/// Exact algebraic inverse of [`apply_effects`] steps 1–2.
///
/// Stock history is append-only: each reversal is a new ADJUSTMENT entry
/// whose note is prefixed "Void In"/"Void Out". The cashbook is NOT
/// reverted here: its entries are keyed by invoice id and the
/// update/delete paths sync or remove them separately.
pub(super) fn revert_effects<B: StorageBackend>(uow: &mut UnitOfWork<'_, B>, invoice: &Invoice) {
    let movement = invoice.kind.stock_movement();
    for item in &invoice.items {
        let reversal = -movement.signed_quantity(item.quantity);
        let prefix = if reversal >= 0 { "Void In" } else { "Void Out" };
        uow.apply_stock_movement(
            &item.product_id,
            Utc::now(),
            StockMovementType::Adjustment,
            reversal,
            Some(format!("{prefix} ({})", invoice.id)),
            Some(invoice.id.clone()),
        );
    }

    uow.apply_party_delta(
        &invoice.party_id,
        -invoice.kind.balance_delta(invoice.total_amount),
    );
}
