use serde::{Deserialize, Serialize};

/// Singleton business profile shown on invoices. Simple configuration, not
/// part of the ledger core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub invoice_footer: Option<String>,
}

impl Default for BusinessInfo {
    fn default() -> Self {
        Self {
            name: "Posbook POS".to_string(),
            address: "Dhaka, Bangladesh".to_string(),
            phone: "01700000000".to_string(),
            email: "info@posbook.local".to_string(),
            invoice_footer: Some("Thank you for your business. Quality guaranteed.".to_string()),
        }
    }
}
