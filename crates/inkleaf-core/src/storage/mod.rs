//! Storage abstraction for persistence.
//!
//! Everything the editor persists is a string stored under a string key.
//! Backends only need get/set/remove and prefix enumeration; the document
//! layout on top of them lives in [`DocumentStore`].

mod documents;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use documents::{DocumentId, DocumentStore, NameError, DOC_SEPARATOR, THUMB_SUFFIX};
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::{FileStore, default_data_dir};

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key-value storage backends.
///
/// Missing keys are not an error: `get` returns `Ok(None)` and `remove` of an
/// absent key succeeds. `set` overwrites (last write wins).
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List every key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

/// Trait for key-value storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List every key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}

/// Create the platform's default backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_store() -> StorageResult<FileStore> {
    FileStore::default_location()
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_store() -> StorageResult<LocalStorageStore> {
    LocalStorageStore::new()
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = FileStore;

#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStorageStore;
