//! Document library layout on top of a key-value backend.
//!
//! Content key:   `{owner}-doc-{name}`
//! Thumbnail key: `{owner}-doc-{name}-thumb`

use super::{KeyValueStore, StorageResult};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Separator between the owner namespace and the document name.
pub const DOC_SEPARATOR: &str = "-doc-";

/// Suffix appended to a content key to form its thumbnail key.
pub const THUMB_SUFFIX: &str = "-thumb";

/// Rejected document names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Document name is empty")]
    Empty,
    #[error("Document name must not end with \"-thumb\": {0}")]
    Reserved(String),
}

/// A document identified by its owner namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    owner: String,
    name: String,
}

impl DocumentId {
    /// Build an id, trimming the name.
    ///
    /// Names ending in the thumbnail suffix are refused since their content
    /// key would be hidden from listings.
    pub fn new(owner: impl Into<String>, name: &str) -> Result<Self, NameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.ends_with(THUMB_SUFFIX) {
            return Err(NameError::Reserved(name.to_string()));
        }
        Ok(Self {
            owner: owner.into(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage key of the serialized scene.
    pub fn content_key(&self) -> String {
        format!("{}{}{}", self.owner, DOC_SEPARATOR, self.name)
    }

    /// Storage key of the cached thumbnail.
    pub fn thumbnail_key(&self) -> String {
        format!("{}{}", self.content_key(), THUMB_SUFFIX)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content_key())
    }
}

/// Document library backed by a key-value store.
pub struct DocumentStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> DocumentStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Store document content. Last write wins.
    pub fn save(&self, id: &DocumentId, content: &str) -> StorageResult<()> {
        self.backend.set(&id.content_key(), content)
    }

    /// Load document content, `None` if it was never saved.
    pub fn load(&self, id: &DocumentId) -> StorageResult<Option<String>> {
        self.backend.get(&id.content_key())
    }

    /// Remove the document and its thumbnail.
    pub fn delete(&self, id: &DocumentId) -> StorageResult<()> {
        // Thumbnail first so a failed delete never orphans a thumbnail.
        self.backend.remove(&id.thumbnail_key())?;
        self.backend.remove(&id.content_key())
    }

    /// Names of every document owned by `owner`.
    pub fn list(&self, owner: &str) -> StorageResult<BTreeSet<String>> {
        let prefix = format!("{}{}", owner, DOC_SEPARATOR);
        Ok(self
            .backend
            .keys_with_prefix(&prefix)?
            .into_iter()
            .filter(|key| !key.ends_with(THUMB_SUFFIX))
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Check if a document has content stored.
    pub fn exists(&self, id: &DocumentId) -> StorageResult<bool> {
        Ok(self.load(id)?.is_some())
    }

    pub fn save_thumbnail(&self, id: &DocumentId, data_url: &str) -> StorageResult<()> {
        self.backend.set(&id.thumbnail_key(), data_url)
    }

    pub fn load_thumbnail(&self, id: &DocumentId) -> StorageResult<Option<String>> {
        self.backend.get(&id.thumbnail_key())
    }

    /// Get a reference to the key-value backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn id(owner: &str, name: &str) -> DocumentId {
        DocumentId::new(owner, name).unwrap()
    }

    #[test]
    fn test_key_layout() {
        let doc = id("student-42", "sheet1");
        assert_eq!(doc.content_key(), "student-42-doc-sheet1");
        assert_eq!(doc.thumbnail_key(), "student-42-doc-sheet1-thumb");
    }

    #[test]
    fn test_name_validation() {
        assert_eq!(DocumentId::new("o", "   "), Err(NameError::Empty));
        assert_eq!(DocumentId::new("o", ""), Err(NameError::Empty));
        assert!(matches!(
            DocumentId::new("o", "page-thumb"),
            Err(NameError::Reserved(_))
        ));
        assert_eq!(DocumentId::new("o", "  maths ").unwrap().name(), "maths");
    }

    #[test]
    fn test_list_excludes_thumbnails_and_other_owners() {
        let store = DocumentStore::new(MemoryStore::new());
        let a = id("student-1", "a");
        let b = id("student-1", "b");
        store.save(&a, "{}").unwrap();
        store.save(&b, "{}").unwrap();
        store.save_thumbnail(&a, "data:image/png;base64,").unwrap();
        store.save(&id("student-2", "c"), "{}").unwrap();

        let names = store.list("student-1").unwrap();
        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_delete_removes_content_and_thumbnail() {
        let store = DocumentStore::new(MemoryStore::new());
        let doc = id("student-1", "a");
        store.save(&doc, "{}").unwrap();
        store.save_thumbnail(&doc, "thumb").unwrap();

        store.delete(&doc).unwrap();

        assert!(store.load(&doc).unwrap().is_none());
        assert!(store.load_thumbnail(&doc).unwrap().is_none());
        assert!(store.list("student-1").unwrap().is_empty());
    }

    #[test]
    fn test_save_is_idempotent() {
        let store = DocumentStore::new(MemoryStore::new());
        let doc = id("o", "x");
        store.save(&doc, "one").unwrap();
        store.save(&doc, "one").unwrap();
        store.save(&doc, "two").unwrap();
        assert_eq!(store.load(&doc).unwrap().as_deref(), Some("two"));
        assert_eq!(store.backend().len(), 1);
    }

    #[test]
    fn test_owner_prefix_does_not_leak() {
        // "student-1" must not list documents of "student-10"
        let store = DocumentStore::new(MemoryStore::new());
        store.save(&id("student-10", "x"), "{}").unwrap();
        assert!(store.list("student-1").unwrap().is_empty());
    }
}
