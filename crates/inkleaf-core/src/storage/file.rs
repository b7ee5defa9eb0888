//! File-based storage implementation for native platforms.

use super::{KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of every entry file.
const ENTRY_EXTENSION: &str = "entry";

/// File-based storage for native platforms.
///
/// Each key is one file in the base directory. Keys are escaped into file
/// names reversibly so that prefix listing can recover the original key.
pub struct FileStore {
    /// Base directory for entries.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/inkleaf/store/`
    /// On Windows: `%LOCALAPPDATA%\inkleaf\store\`
    pub fn default_location() -> StorageResult<Self> {
        Self::new(default_data_dir()?.join("store"))
    }

    /// Get the file path for a key.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", escape_key(key), ENTRY_EXTENSION))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Default data directory for the application.
pub fn default_data_dir() -> StorageResult<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
    Ok(base.join("inkleaf"))
}

/// Escape a key into a file-name-safe string.
///
/// Alphanumerics, `-` and `_` pass through; every other byte becomes `~XX`.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("~{:02X}", byte));
        }
    }
    out
}

/// Inverse of [`escape_key`]. Returns `None` for names this store did not write.
fn unescape_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'~' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let path = self.entry_path(key);
        // Write-then-rename so a crash never leaves a truncated entry.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == ENTRY_EXTENSION).unwrap_or(false) {
                if let Some(key) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(unescape_key)
                {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_set_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("student-1-doc-sheet", "{}").unwrap();
        assert_eq!(
            store.get("student-1-doc-sheet").unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_file_store_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_file_store_prefix_listing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("a-doc-1", "x").unwrap();
        store.set("a-doc-2", "x").unwrap();
        store.set("b-doc-1", "x").unwrap();

        let keys = store.keys_with_prefix("a-doc-").unwrap();
        assert_eq!(keys, vec!["a-doc-1".to_string(), "a-doc-2".to_string()]);
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        // Removing again is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_file_store_keys_with_special_characters() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let key = "student-7-doc-week 3/maths: part*2";
        store.set(key, "content").unwrap();

        assert_eq!(store.get(key).unwrap().as_deref(), Some("content"));
        assert_eq!(store.keys_with_prefix("student-7-doc-").unwrap(), vec![key.to_string()]);
    }

    #[test]
    fn test_escape_roundtrip_is_distinct() {
        // Distinct keys must never collide on disk
        assert_ne!(escape_key("a b"), escape_key("a_b"));
        assert_eq!(unescape_key(&escape_key("ü~x")).as_deref(), Some("ü~x"));
    }
}
