use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posbook_core::{DomainError, DomainResult, ProductId};

/// Low-stock threshold applied when a product has no explicit reorder level.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Catalog record: a sellable (or purchasable) item.
///
/// `stock` is a cache of the current on-hand quantity. The stock ledger is
/// the source of truth: `stock` must equal opening stock plus the signed sum
/// of all stock transactions for this product, and every mutation path is
/// responsible for keeping the two in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// Sale unit price in the smallest currency unit (e.g., cents).
    pub price: i64,
    /// Purchase unit cost in the smallest currency unit.
    pub cost: i64,
    /// Cached on-hand quantity. May legitimately go negative (backorders).
    pub stock: i64,
    /// Unit label shown on invoices (e.g., "pc", "kg").
    pub unit: String,
    pub opening_stock: Option<i64>,
    /// Minimum stock before the low-stock alert.
    pub reorder_level: Option<i64>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// Default per-unit flat discount in the smallest currency unit.
    pub discount: Option<i64>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: i64, cost: i64) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            barcode: None,
            category: None,
            brand: None,
            description: None,
            price,
            cost,
            stock: 0,
            unit: "pc".to_string(),
            opening_stock: None,
            reorder_level: None,
            batch_number: None,
            expiry_date: None,
            discount: None,
        }
    }

    /// Validate caller-supplied fields before persisting.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if self.price < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if self.cost < 0 {
            return Err(DomainError::validation("cost cannot be negative"));
        }
        Ok(())
    }

    pub fn reorder_threshold(&self) -> i64 {
        self.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL)
    }

    /// Whether the cached stock sits at or under the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_threshold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product() -> Product {
        Product::new(ProductId::new("PROD-001"), "Display Panel", 4500, 3200)
    }

    #[test]
    fn validate_rejects_blank_name_and_negative_money() {
        let mut p = test_product();
        assert!(p.validate().is_ok());

        p.name = "  ".to_string();
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));

        let mut p = test_product();
        p.price = -1;
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn low_stock_uses_default_threshold_when_unset() {
        let mut p = test_product();
        p.stock = 10;
        assert!(p.is_low_stock());

        p.stock = 11;
        assert!(!p.is_low_stock());

        p.reorder_level = Some(3);
        p.stock = 4;
        assert!(!p.is_low_stock());
        p.stock = 3;
        assert!(p.is_low_stock());
    }

    #[test]
    fn negative_stock_is_representable() {
        let mut p = test_product();
        p.stock = -2;
        assert!(p.is_low_stock());
    }
}
