use posbook_catalog::Product;

use crate::store::{RecordStore, StorageBackend};

/// Products at or under their reorder threshold, lowest stock first.
///
/// Negative stock is legitimate (backorders); nothing in the write path
/// blocks it, so this is the surface where callers read the data-quality
/// signal.
pub fn low_stock<B: StorageBackend>(store: &RecordStore<B>) -> Vec<Product> {
    let mut products: Vec<Product> = store
        .products()
        .into_iter()
        .filter(|p| p.is_low_stock())
        .collect();
    products.sort_by_key(|p| p.stock);
    products
}
