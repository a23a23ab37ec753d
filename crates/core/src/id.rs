//! Strongly-typed identifiers used across the domain.
//!
//! Identifiers are domain strings rather than raw UUIDs: the cashbook
//! contract requires ids that are derivable from an invoice id
//! (`CASH-INV-<invoice>`), and imported records keep whatever ids the
//! caller minted. Generated ids embed a UUIDv7 (time-ordered).

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! impl_string_id {
    ($t:ident, $name:literal, $prefix:literal) => {
        /// Identifier newtype over a non-empty domain string.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            /// Wrap an existing identifier without validation.
            ///
            /// Prefer `FromStr` at trust boundaries; this is for ids the
            /// caller already owns (store reads, test fixtures).
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing ids explicitly in
            /// tests for determinism.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::now_v7()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty")));
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_string_id!(ProductId, "ProductId", "PROD");
impl_string_id!(PartyId, "PartyId", "PARTY");
impl_string_id!(InvoiceId, "InvoiceId", "INV");
impl_string_id!(CashTxId, "CashTxId", "CASH");
impl_string_id!(StockTxId, "StockTxId", "STK");
impl_string_id!(PaymentId, "PaymentId", "PAY");

impl CashTxId {
    /// Prefix of the single deterministic cash entry an invoice owns.
    pub const LINKED_PREFIX: &'static str = "CASH-INV-";

    /// Deterministic id of the cash entry that mirrors an invoice's initial
    /// payment. Invoice edits and deletes locate the entry by re-deriving
    /// this id; additional partial payments get independent ids instead.
    pub fn for_invoice(invoice_id: &InvoiceId) -> Self {
        Self(format!("{}{}", Self::LINKED_PREFIX, invoice_id))
    }
}
