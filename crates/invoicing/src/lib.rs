//! Invoices: sales, purchases, and both return kinds.

pub mod invoice;

pub use invoice::{Invoice, InvoiceItem, InvoicePayment, PaymentStatus, TransactionType};
