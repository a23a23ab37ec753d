use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-level error.
///
/// Reads fall back to default/empty values at the record-store layer, so
/// these surface only on the write path, where they abort the operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The underlying persistence is unreachable (I/O failure, poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A collection failed to serialize.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Keyed string storage: the persistence primitive under the record store.
///
/// Implementations persist opaque serialized collections by name; they carry
/// no business logic.
pub trait StorageBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn put(&self, key: &str, value: String) -> StoreResult<()>;
}

/// In-memory backend.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
