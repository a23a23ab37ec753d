//! Infrastructure layer: record store, invoice effects engine, reporting,
//! backup/restore.

pub mod backup;
pub mod engine;
pub mod reports;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use engine::{EngineError, EngineResult, LedgerEngine};
pub use store::{JsonFileBackend, MemoryBackend, RecordStore, StorageBackend, StoreError, StoreResult};
