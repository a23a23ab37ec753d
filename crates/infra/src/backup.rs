//! Whole-store backup: export to a single serializable snapshot, import
//! that overwrites named collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use posbook_catalog::Product;
use posbook_cashbook::CashTransaction;
use posbook_invoicing::Invoice;
use posbook_parties::Party;
use posbook_stock::StockTransaction;

use crate::store::{BusinessInfo, RecordStore, StorageBackend, StoreError};

/// Snapshot section names. Distinct from the backend key namespace so a
/// snapshot is portable across backends.
pub mod sections {
    pub const PRODUCTS: &str = "products";
    pub const PARTIES: &str = "parties";
    pub const INVOICES: &str = "invoices";
    pub const STOCK_HISTORY: &str = "stock_history";
    pub const CASHBOOK: &str = "cashbook";
    pub const BUSINESS_INFO: &str = "business_info";
}

/// A flat mapping of collection name to its serialized collection, plus a
/// timestamp. Sections may be absent; import leaves those collections
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub collections: BTreeMap<String, Value>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot failed to parse; the store was not touched.
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn section<T: Serialize>(items: &T) -> Result<Value, SnapshotError> {
    serde_json::to_value(items).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

/// Export every collection into one snapshot.
pub fn export_snapshot<B: StorageBackend>(
    store: &RecordStore<B>,
) -> Result<Snapshot, SnapshotError> {
    let mut collections = BTreeMap::new();
    collections.insert(sections::PRODUCTS.to_string(), section(&store.products())?);
    collections.insert(sections::PARTIES.to_string(), section(&store.parties())?);
    collections.insert(sections::INVOICES.to_string(), section(&store.invoices())?);
    collections.insert(
        sections::STOCK_HISTORY.to_string(),
        section(&store.stock_history())?,
    );
    collections.insert(
        sections::CASHBOOK.to_string(),
        section(&store.cash_transactions())?,
    );
    collections.insert(
        sections::BUSINESS_INFO.to_string(),
        section(&store.business_info())?,
    );
    Ok(Snapshot {
        exported_at: Utc::now(),
        collections,
    })
}

pub fn export_json<B: StorageBackend>(store: &RecordStore<B>) -> Result<String, SnapshotError> {
    let snapshot = export_snapshot(store)?;
    serde_json::to_string_pretty(&snapshot)
        .map_err(|e| StoreError::Serialization(e.to_string()).into())
}

fn decode<T: DeserializeOwned>(
    snapshot: &Snapshot,
    name: &str,
) -> Result<Option<T>, SnapshotError> {
    match snapshot.collections.get(name) {
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| SnapshotError::Malformed(format!("{name}: {e}"))),
        None => Ok(None),
    }
}

/// Import a snapshot, overwriting exactly the collections it carries.
///
/// The whole snapshot is parsed and every present section decoded into its
/// typed form *before* anything is written, so a malformed snapshot leaves
/// the store untouched. Absent sections leave the current collection as is.
pub fn import_json<B: StorageBackend>(
    store: &RecordStore<B>,
    raw: &str,
) -> Result<(), SnapshotError> {
    let snapshot: Snapshot =
        serde_json::from_str(raw).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

    let products: Option<Vec<Product>> = decode(&snapshot, sections::PRODUCTS)?;
    let parties: Option<Vec<Party>> = decode(&snapshot, sections::PARTIES)?;
    let invoices: Option<Vec<Invoice>> = decode(&snapshot, sections::INVOICES)?;
    let stock_history: Option<Vec<StockTransaction>> = decode(&snapshot, sections::STOCK_HISTORY)?;
    let cashbook: Option<Vec<CashTransaction>> = decode(&snapshot, sections::CASHBOOK)?;
    let business_info: Option<BusinessInfo> = decode(&snapshot, sections::BUSINESS_INFO)?;

    if let Some(items) = products {
        store.save_products(&items)?;
    }
    if let Some(items) = parties {
        store.save_parties(&items)?;
    }
    if let Some(items) = invoices {
        store.save_invoices(&items)?;
    }
    if let Some(items) = stock_history {
        store.save_stock_history(&items)?;
    }
    if let Some(items) = cashbook {
        store.save_cash_transactions(&items)?;
    }
    if let Some(info) = business_info {
        store.save_business_info(&info)?;
    }
    Ok(())
}
