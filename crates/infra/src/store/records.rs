use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use posbook_catalog::Product;
use posbook_cashbook::CashTransaction;
use posbook_core::{PartyId, ProductId};
use posbook_invoicing::Invoice;
use posbook_parties::Party;
use posbook_stock::StockTransaction;

use super::backend::{StorageBackend, StoreResult};
use super::profile::BusinessInfo;

/// Collection names in the underlying keyed store.
pub mod keys {
    pub const PRODUCTS: &str = "posbook_products";
    pub const PARTIES: &str = "posbook_parties";
    pub const INVOICES: &str = "posbook_invoices";
    pub const STOCK_HISTORY: &str = "posbook_stock_history";
    pub const CASHBOOK: &str = "posbook_cashbook";
    pub const BUSINESS_INFO: &str = "posbook_business_info";
}

/// Typed access to the named collections of the store.
///
/// Reads are lenient: a missing or unreadable collection falls back to its
/// default (empty) value with a logged warning, so a damaged store never
/// takes the read path down. Writes propagate failures and abort the
/// calling operation.
#[derive(Debug)]
pub struct RecordStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(key, error = %e, "collection failed to parse, falling back to empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "storage unavailable on read, falling back to empty");
                Vec::new()
            }
        }
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<()> {
        let raw = serde_json::to_string(items)
            .map_err(|e| super::backend::StoreError::Serialization(e.to_string()))?;
        self.backend.put(key, raw)
    }

    pub fn products(&self) -> Vec<Product> {
        self.read_collection(keys::PRODUCTS)
    }

    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.products().into_iter().find(|p| &p.id == id)
    }

    pub fn save_products(&self, products: &[Product]) -> StoreResult<()> {
        self.write_collection(keys::PRODUCTS, products)
    }

    pub fn parties(&self) -> Vec<Party> {
        self.read_collection(keys::PARTIES)
    }

    pub fn party(&self, id: &PartyId) -> Option<Party> {
        self.parties().into_iter().find(|p| &p.id == id)
    }

    pub fn save_parties(&self, parties: &[Party]) -> StoreResult<()> {
        self.write_collection(keys::PARTIES, parties)
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.read_collection(keys::INVOICES)
    }

    pub fn save_invoices(&self, invoices: &[Invoice]) -> StoreResult<()> {
        self.write_collection(keys::INVOICES, invoices)
    }

    pub fn stock_history(&self) -> Vec<StockTransaction> {
        self.read_collection(keys::STOCK_HISTORY)
    }

    pub fn save_stock_history(&self, entries: &[StockTransaction]) -> StoreResult<()> {
        self.write_collection(keys::STOCK_HISTORY, entries)
    }

    pub fn cash_transactions(&self) -> Vec<CashTransaction> {
        self.read_collection(keys::CASHBOOK)
    }

    pub fn save_cash_transactions(&self, entries: &[CashTransaction]) -> StoreResult<()> {
        self.write_collection(keys::CASHBOOK, entries)
    }

    pub fn business_info(&self) -> BusinessInfo {
        match self.backend.get(keys::BUSINESS_INFO) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "business profile failed to parse, using defaults");
                BusinessInfo::default()
            }),
            Ok(None) => BusinessInfo::default(),
            Err(e) => {
                warn!(error = %e, "storage unavailable on read, using default profile");
                BusinessInfo::default()
            }
        }
    }

    pub fn save_business_info(&self, info: &BusinessInfo) -> StoreResult<()> {
        let raw = serde_json::to_string(info)
            .map_err(|e| super::backend::StoreError::Serialization(e.to_string()))?;
        self.backend.put(keys::BUSINESS_INFO, raw)
    }

    /// Seed a fresh store: a walk-in customer and a small demo catalog.
    /// No-op on stores that already hold data.
    pub fn initialize_defaults(&self) -> StoreResult<()> {
        if self.products().is_empty() {
            let demos = demo_products();
            self.save_products(&demos)?;
        }
        if self.parties().is_empty() {
            self.save_parties(&[Party::walk_in()])?;
        }
        Ok(())
    }
}

fn demo_products() -> Vec<Product> {
    let mut display = Product::new(
        ProductId::new("PROD-001"),
        "Original Display (iPhone 11)",
        450_000,
        320_000,
    );
    display.sku = Some("DISP-I11".to_string());
    display.category = Some("Display".to_string());
    display.stock = 15;

    let mut battery = Product::new(
        ProductId::new("PROD-002"),
        "Premium Battery (iPhone X)",
        180_000,
        110_000,
    );
    battery.sku = Some("BATT-IX".to_string());
    battery.category = Some("Battery".to_string());
    battery.stock = 25;

    let mut charger = Product::new(ProductId::new("PROD-003"), "Fast Charger 20W", 95_000, 45_000);
    charger.sku = Some("CHRG-20W".to_string());
    charger.category = Some("Accessories".to_string());
    charger.stock = 50;

    vec![display, battery, charger]
}
