//! Record store: generic persistence of named collections over a keyed
//! storage backend.

pub mod backend;
pub mod json_file;
pub mod profile;
pub mod records;

pub use backend::{MemoryBackend, StorageBackend, StoreError, StoreResult};
pub use json_file::JsonFileBackend;
pub use profile::BusinessInfo;
pub use records::{keys, RecordStore};
