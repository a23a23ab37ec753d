use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::backend::{StorageBackend, StoreError, StoreResult};

/// File-backed backend: one JSON document mapping collection names to their
/// serialized contents, the offline analogue of browser local storage.
///
/// The whole map is rewritten on every `put`; write goes through a sibling
/// temp file followed by a rename so a crash mid-write cannot truncate the
/// previous snapshot.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonFileBackend {
    /// Open (or create) the backing file.
    ///
    /// A missing file starts empty; an unreadable or malformed file is an
    /// error so a corrupt store is never silently overwritten.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    fn flush(&self, cache: &BTreeMap<String, String>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(cache)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let cache = self
            .cache
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(cache.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> StoreResult<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        cache.insert(key.to_string(), value);
        self.flush(&cache)
    }
}
