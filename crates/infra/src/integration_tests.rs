//! Integration tests for the full ledger pipeline.
//!
//! Verifies the end-to-end consistency rules across collections:
//! - stock conservation (cache equals the signed ledger sum)
//! - revert symmetry (create + delete restores prior state bit-for-bit)
//! - update = revert + reapply
//! - cashbook linkage integrity on invoice deletion

use chrono::Utc;
use proptest::prelude::*;

use posbook_catalog::Product;
use posbook_cashbook::{CashFlow, CashTransaction};
use posbook_core::{CashTxId, InvoiceId, PartyId, ProductId};
use posbook_invoicing::{Invoice, InvoiceItem, PaymentStatus, TransactionType};
use posbook_parties::{Party, PartyKind};
use posbook_stock::StockMovementType;

use crate::engine::{EngineError, LedgerEngine};
use crate::store::{MemoryBackend, RecordStore};

fn engine() -> LedgerEngine<MemoryBackend> {
    LedgerEngine::new(RecordStore::new(MemoryBackend::new()))
}

fn save_product(engine: &LedgerEngine<MemoryBackend>, id: &str, price: i64, cost: i64, stock: i64) {
    let mut product = Product::new(ProductId::new(id), format!("Product {id}"), price, cost);
    product.stock = stock;
    engine.save_product(product).unwrap();
}

fn save_party(engine: &LedgerEngine<MemoryBackend>, id: &str, kind: PartyKind) {
    engine
        .save_party(Party::new(PartyId::new(id), format!("Party {id}"), "0170", kind))
        .unwrap();
}

fn invoice(
    id: &str,
    party: &str,
    kind: TransactionType,
    lines: &[(&str, i64, i64)],
    received: i64,
) -> Invoice {
    let mut inv = Invoice::new(
        InvoiceId::new(id),
        Utc::now(),
        PartyId::new(party),
        format!("Party {party}"),
        kind,
    );
    for (product, qty, price) in lines {
        inv.items.push(InvoiceItem::new(
            ProductId::new(*product),
            format!("Product {product}"),
            *qty,
            *price,
            0,
        ));
    }
    inv.received_amount = received;
    inv.recompute_totals();
    inv
}

fn stock_of(engine: &LedgerEngine<MemoryBackend>, id: &str) -> i64 {
    engine.store().product(&ProductId::new(id)).unwrap().stock
}

fn balance_of(engine: &LedgerEngine<MemoryBackend>, id: &str) -> i64 {
    engine.store().party(&PartyId::new(id)).unwrap().balance
}

// ----------------------------------------------------------------------
// End-to-end flows
// ----------------------------------------------------------------------

/// A fully paid sale nets the party balance to zero: the full sale books
/// onto the balance, the auto-generated cash-in books it back.
#[test]
fn paid_sale_books_stock_and_nets_party_balance() {
    let eng = engine();
    save_product(&eng, "P", 100, 60, 0);
    save_party(&eng, "C", PartyKind::Customer);

    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("P", 1, 100)], 100))
        .unwrap();

    // Stock may legitimately go negative.
    assert_eq!(stock_of(&eng, "P"), -1);

    let history = eng.stock_history(Some(&ProductId::new("P")));
    let sale_entry = history
        .iter()
        .find(|e| e.movement == StockMovementType::Sale)
        .unwrap();
    assert_eq!(sale_entry.quantity, -1);
    assert_eq!(sale_entry.reference_id, Some(InvoiceId::new("INV-1")));

    // +100 (sale) then −100 (linked cash-in) = 0.
    assert_eq!(balance_of(&eng, "C"), 0);

    let saved = &eng.store().invoices()[0];
    assert_eq!(saved.status, PaymentStatus::Paid);
    assert_eq!(saved.due_amount, 0);
    // The upfront amount is back-filled into the payment history.
    assert_eq!(saved.payments.len(), 1);
    assert_eq!(saved.payments[0].amount, 100);

    let linked = eng
        .store()
        .cash_transactions()
        .into_iter()
        .find(|t| t.id == CashTxId::for_invoice(&InvoiceId::new("INV-1")))
        .unwrap();
    assert_eq!(linked.amount, 100);
    assert_eq!(linked.flow, CashFlow::In);
}

/// With stock pre-set to 10 the same sale lands on 9.
#[test]
fn sale_decrements_existing_stock() {
    let eng = engine();
    save_product(&eng, "P", 100, 60, 10);
    save_party(&eng, "C", PartyKind::Customer);

    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("P", 1, 100)], 100))
        .unwrap();
    assert_eq!(stock_of(&eng, "P"), 9);
}

/// An unpaid purchase books stock in, pushes the supplier balance payable,
/// and creates no cash entry.
#[test]
fn unpaid_purchase_books_payable_without_cash_entry() {
    let eng = engine();
    save_product(&eng, "P", 100, 50, 0);
    save_party(&eng, "S", PartyKind::Supplier);

    eng.create_invoice(invoice("INV-2", "S", TransactionType::Purchase, &[("P", 5, 50)], 0))
        .unwrap();

    assert_eq!(stock_of(&eng, "P"), 5);
    assert_eq!(balance_of(&eng, "S"), -250);

    let saved = &eng.store().invoices()[0];
    assert_eq!(saved.due_amount, 250);
    assert_eq!(saved.status, PaymentStatus::Unpaid);
    assert!(saved.payments.is_empty());
    assert!(eng.store().cash_transactions().is_empty());
}

/// Deleting the purchase reverts stock through a visible "Void Out"
/// adjustment and restores the supplier balance.
#[test]
fn delete_reverts_purchase_with_void_entry() {
    let eng = engine();
    save_product(&eng, "P", 100, 50, 0);
    save_party(&eng, "S", PartyKind::Supplier);
    eng.create_invoice(invoice("INV-2", "S", TransactionType::Purchase, &[("P", 5, 50)], 0))
        .unwrap();

    eng.delete_invoice(&InvoiceId::new("INV-2")).unwrap();

    assert_eq!(stock_of(&eng, "P"), 0);
    assert_eq!(balance_of(&eng, "S"), 0);
    assert!(eng.store().invoices().is_empty());
    assert!(eng.store().cash_transactions().is_empty());

    // The reversal is appended, not erased: newest entry is the void.
    let history = eng.stock_history(Some(&ProductId::new("P")));
    let void = &history[0];
    assert_eq!(void.movement, StockMovementType::Adjustment);
    assert_eq!(void.quantity, -5);
    assert!(void.note.as_deref().unwrap().starts_with("Void Out"));
    // The original purchase entry is still present.
    assert!(history.iter().any(|e| e.movement == StockMovementType::Purchase && e.quantity == 5));
}

/// A partial payment on the purchase creates its own independently-id'd
/// linked cash entry and re-derives due/status.
#[test]
fn partial_payment_books_independent_cash_out() {
    let eng = engine();
    save_product(&eng, "P", 100, 50, 0);
    save_party(&eng, "S", PartyKind::Supplier);
    eng.create_invoice(invoice("INV-2", "S", TransactionType::Purchase, &[("P", 5, 50)], 0))
        .unwrap();

    eng.add_invoice_payment(&InvoiceId::new("INV-2"), 100, Utc::now(), Some("partial".into()))
        .unwrap();

    let saved = &eng.store().invoices()[0];
    assert_eq!(saved.received_amount, 100);
    assert_eq!(saved.due_amount, 150);
    assert_eq!(saved.status, PaymentStatus::Partial);

    let cash = eng.store().cash_transactions();
    assert_eq!(cash.len(), 1);
    assert_eq!(cash[0].flow, CashFlow::Out);
    assert_eq!(cash[0].amount, 100);
    assert_eq!(cash[0].linked_invoice_id, Some(InvoiceId::new("INV-2")));
    assert!(!cash[0].id.as_str().starts_with(CashTxId::LINKED_PREFIX));

    // Supplier: −250 (purchase) + 100 (cash out) = −150 = −due.
    assert_eq!(balance_of(&eng, "S"), -150);
}

/// Deleting a party-linked cash entry reverses exactly its own effect,
/// however many entries were recorded for that party since.
#[test]
fn cash_delete_reverses_exactly_its_own_effect() {
    let eng = engine();
    save_party(&eng, "C", PartyKind::Customer);

    let mut first = CashTransaction::new(CashTxId::new("C1"), Utc::now(), CashFlow::In, 100, "General");
    first.party_id = Some(PartyId::new("C"));
    first.party_name = Some("Party C".to_string());
    eng.save_cash_transaction(first).unwrap();

    for (id, flow, amount) in [("C2", CashFlow::Out, 30), ("C3", CashFlow::In, 45)] {
        let mut tx = CashTransaction::new(CashTxId::new(id), Utc::now(), flow, amount, "General");
        tx.party_id = Some(PartyId::new("C"));
        eng.save_cash_transaction(tx).unwrap();
    }
    assert_eq!(balance_of(&eng, "C"), -100 + 30 - 45);

    eng.delete_cash_transaction(&CashTxId::new("C1")).unwrap();
    assert_eq!(balance_of(&eng, "C"), 30 - 45);
}

// ----------------------------------------------------------------------
// Ledger properties
// ----------------------------------------------------------------------

/// Create followed by delete restores every touched stock level and party
/// balance bit-for-bit.
#[test]
fn revert_symmetry_restores_prior_state() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 7);
    save_product(&eng, "B", 200, 90, 3);
    save_party(&eng, "C", PartyKind::Customer);
    // Pre-existing unrelated position.
    eng.create_invoice(invoice("INV-0", "C", TransactionType::Sale, &[("A", 2, 100)], 0))
        .unwrap();

    let stock_a = stock_of(&eng, "A");
    let stock_b = stock_of(&eng, "B");
    let balance = balance_of(&eng, "C");

    eng.create_invoice(invoice(
        "INV-1",
        "C",
        TransactionType::Sale,
        &[("A", 3, 100), ("B", 1, 200)],
        250,
    ))
    .unwrap();
    eng.delete_invoice(&InvoiceId::new("INV-1")).unwrap();

    assert_eq!(stock_of(&eng, "A"), stock_a);
    assert_eq!(stock_of(&eng, "B"), stock_b);
    assert_eq!(balance_of(&eng, "C"), balance);
}

/// Updating invoice A to A' yields the same stocks and balances as applying
/// A' to a fresh store, whatever changed in between.
#[test]
fn update_equals_revert_plus_reapply() {
    let build = || {
        let eng = engine();
        save_product(&eng, "A", 100, 60, 10);
        save_product(&eng, "B", 200, 90, 10);
        save_party(&eng, "C", PartyKind::Customer);
        save_party(&eng, "S", PartyKind::Supplier);
        eng
    };

    let updated = build();
    updated
        .create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 4, 100)], 400))
        .unwrap();
    // Change type, party, items and payment in one update.
    updated
        .update_invoice(
            &InvoiceId::new("INV-1"),
            invoice("INV-1", "S", TransactionType::Purchase, &[("B", 2, 200)], 150),
        )
        .unwrap();

    let direct = build();
    direct
        .create_invoice(invoice("INV-1", "S", TransactionType::Purchase, &[("B", 2, 200)], 150))
        .unwrap();

    for product in ["A", "B"] {
        assert_eq!(stock_of(&updated, product), stock_of(&direct, product));
    }
    for party in ["C", "S"] {
        assert_eq!(balance_of(&updated, party), balance_of(&direct, party));
    }

    let a = &updated.store().invoices()[0];
    let b = &direct.store().invoices()[0];
    assert_eq!(a.total_amount, b.total_amount);
    assert_eq!(a.due_amount, b.due_amount);
    assert_eq!(a.status, b.status);

    // The linked cash entry tracked the update.
    let linked = updated
        .store()
        .cash_transactions()
        .into_iter()
        .find(|t| t.id == CashTxId::for_invoice(&InvoiceId::new("INV-1")))
        .unwrap();
    assert_eq!(linked.amount, 150);
    assert_eq!(linked.flow, CashFlow::Out);
}

/// Dropping the payment on update removes the now-stale linked cash entry
/// and reverses its balance effect.
#[test]
fn update_to_zero_received_removes_linked_cash() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 10);
    save_party(&eng, "C", PartyKind::Customer);
    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 1, 100)], 100))
        .unwrap();
    assert_eq!(balance_of(&eng, "C"), 0);

    eng.update_invoice(
        &InvoiceId::new("INV-1"),
        invoice("INV-1", "C", TransactionType::Sale, &[("A", 1, 100)], 0),
    )
    .unwrap();

    assert!(eng.store().cash_transactions().is_empty());
    // Full receivable outstanding again.
    assert_eq!(balance_of(&eng, "C"), 100);
    assert_eq!(eng.store().invoices()[0].status, PaymentStatus::Unpaid);
}

/// Deleting an invoice removes every cash entry linked to it, and no
/// others.
#[test]
fn invoice_delete_sweeps_exactly_its_linked_cash() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 20);
    save_party(&eng, "C", PartyKind::Customer);

    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 1, 100)], 50))
        .unwrap();
    eng.add_invoice_payment(&InvoiceId::new("INV-1"), 25, Utc::now(), None)
        .unwrap();

    eng.create_invoice(invoice("INV-2", "C", TransactionType::Sale, &[("A", 1, 100)], 100))
        .unwrap();
    eng.save_cash_transaction(CashTransaction::new(
        CashTxId::new("MANUAL"),
        Utc::now(),
        CashFlow::Out,
        10,
        "Expense",
    ))
    .unwrap();

    eng.delete_invoice(&InvoiceId::new("INV-1")).unwrap();

    let remaining: Vec<_> = eng.store().cash_transactions();
    assert_eq!(remaining.len(), 2);
    assert!(remaining
        .iter()
        .any(|t| t.id == CashTxId::for_invoice(&InvoiceId::new("INV-2"))));
    assert!(remaining.iter().any(|t| t.id == CashTxId::new("MANUAL")));
    assert!(!remaining
        .iter()
        .any(|t| t.linked_invoice_id == Some(InvoiceId::new("INV-1"))));
}

/// Bulk update of a multi-payment invoice is refused before any mutation.
#[test]
fn multi_payment_update_is_refused_untouched() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 10);
    save_party(&eng, "C", PartyKind::Customer);
    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 2, 100)], 50))
        .unwrap();
    eng.add_invoice_payment(&InvoiceId::new("INV-1"), 50, Utc::now(), None)
        .unwrap();

    let stock = stock_of(&eng, "A");
    let balance = balance_of(&eng, "C");
    let cash_count = eng.store().cash_transactions().len();

    let err = eng
        .update_invoice(
            &InvoiceId::new("INV-1"),
            invoice("INV-1", "C", TransactionType::Sale, &[("A", 9, 100)], 0),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::MultiPaymentUpdate(_)));

    assert_eq!(stock_of(&eng, "A"), stock);
    assert_eq!(balance_of(&eng, "C"), balance);
    assert_eq!(eng.store().cash_transactions().len(), cash_count);
    assert_eq!(eng.store().invoices()[0].items[0].quantity, 2);
}

/// Invoice-linked cash entries expose a lock, not a delete.
#[test]
fn linked_cash_entry_cannot_be_deleted_independently() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 10);
    save_party(&eng, "C", PartyKind::Customer);
    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 1, 100)], 100))
        .unwrap();

    let linked = CashTxId::for_invoice(&InvoiceId::new("INV-1"));
    let err = eng.delete_cash_transaction(&linked).unwrap_err();
    assert!(matches!(err, EngineError::LockedCashTransaction { .. }));
    assert_eq!(eng.store().cash_transactions().len(), 1);
}

// ----------------------------------------------------------------------
// Lenient edge cases
// ----------------------------------------------------------------------

#[test]
fn missing_invoice_ids_are_silent_no_ops() {
    let eng = engine();
    let ghost = InvoiceId::new("INV-GHOST");
    eng.update_invoice(&ghost, invoice("INV-GHOST", "C", TransactionType::Sale, &[], 0))
        .unwrap();
    eng.delete_invoice(&ghost).unwrap();
    eng.add_invoice_payment(&ghost, 100, Utc::now(), None).unwrap();
    assert!(eng.store().invoices().is_empty());
    assert!(eng.store().cash_transactions().is_empty());
}

#[test]
fn zero_item_invoice_and_missing_party_are_tolerated() {
    let eng = engine();
    // No products, no parties: effects all skip, the record still lands.
    eng.create_invoice(invoice("INV-1", "NOBODY", TransactionType::Sale, &[], 0))
        .unwrap();
    assert_eq!(eng.store().invoices().len(), 1);
    assert!(eng.store().stock_history().is_empty());
}

#[test]
fn line_items_of_deleted_products_are_skipped_silently() {
    let eng = engine();
    save_product(&eng, "A", 100, 60, 10);
    save_party(&eng, "C", PartyKind::Customer);
    eng.delete_product(&ProductId::new("A")).unwrap();

    eng.create_invoice(invoice("INV-1", "C", TransactionType::Sale, &[("A", 2, 100)], 0))
        .unwrap();
    // Balance effect still applies; stock effect skipped.
    assert_eq!(balance_of(&eng, "C"), 200);
    assert!(eng
        .stock_history(Some(&ProductId::new("A")))
        .iter()
        .all(|e| e.movement == StockMovementType::Opening));
}

// ----------------------------------------------------------------------
// Stock conservation property
// ----------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: after any sequence of invoice creates and deletes, the
    /// cached stock equals the signed sum of the product's ledger entries.
    #[test]
    fn stock_cache_equals_ledger_sum(
        ops in prop::collection::vec((any::<bool>(), 1i64..20), 1..12),
        delete_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let eng = engine();
        save_product(&eng, "P", 100, 50, 5);
        save_party(&eng, "C", PartyKind::Customer);

        for (i, (is_sale, qty)) in ops.iter().enumerate() {
            let kind = if *is_sale { TransactionType::Sale } else { TransactionType::Purchase };
            eng.create_invoice(invoice(&format!("INV-{i}"), "C", kind, &[("P", *qty, 100)], 0))
                .unwrap();
        }
        for (i, delete) in delete_mask.iter().take(ops.len()).enumerate() {
            if *delete {
                eng.delete_invoice(&InvoiceId::new(format!("INV-{i}"))).unwrap();
            }
        }

        let ledger_sum: i64 = eng
            .stock_history(Some(&ProductId::new("P")))
            .iter()
            .map(|e| e.quantity)
            .sum();
        prop_assert_eq!(stock_of(&eng, "P"), ledger_sum);
    }
}
