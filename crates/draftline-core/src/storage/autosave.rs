//! Auto-save of the working document.
//!
//! The session writes the whole document under one key after every
//! committed mutation and reads it back at startup.

use super::{Storage, StorageError, StorageResult};
use crate::document::Document;
use std::fmt;
use std::sync::Arc;

/// Key under which the working document is stored.
pub const DEFAULT_AUTOSAVE_KEY: &str = "draftline.session";

/// Persists a document under a fixed key.
#[derive(Clone)]
pub struct AutoSave {
    /// Storage backend.
    storage: Arc<dyn Storage>,
    /// Key the document is stored under.
    key: String,
    /// Whether the last save attempt failed.
    dirty: bool,
}

impl fmt::Debug for AutoSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSave")
            .field("key", &self.key)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl AutoSave {
    /// Create an auto-saver using the default key.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_key(storage, DEFAULT_AUTOSAVE_KEY)
    }

    /// Create an auto-saver storing under `key`.
    pub fn with_key(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the most recent save failed and the store is out of date.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document.
    pub fn save(&mut self, document: &Document) -> StorageResult<()> {
        let result = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| self.storage.set(&self.key, &json));
        self.dirty = result.is_err();
        result
    }

    /// Read the saved document.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> StorageResult<Option<Document>> {
        let json = match self.storage.get(&self.key) {
            Ok(json) => json,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        Document::import_json(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", self.key, e)))
    }

    /// Forget the saved document.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(&self.key)
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Primitive;
    use crate::storage::MemoryStorage;
    use crate::units::{Calibration, Unit};
    use kurbo::Point;

    #[test]
    fn test_load_without_save_is_none() {
        let autosave = AutoSave::new(Arc::new(MemoryStorage::new()));
        assert!(autosave.load().unwrap().is_none());
        assert!(!autosave.is_dirty());
    }

    #[test]
    fn test_save_and_load() {
        let storage = Arc::new(MemoryStorage::new());
        let mut autosave = AutoSave::new(storage.clone());

        let mut doc = Document::new();
        doc.add(Primitive::window(Point::new(1.0, 2.0), Point::new(3.0, 4.0)));
        doc.calibration = Calibration::with_factor(0.25, Unit::In);
        autosave.save(&doc).unwrap();
        assert!(storage.contains(DEFAULT_AUTOSAVE_KEY).unwrap());

        let restored = AutoSave::new(storage).load().unwrap().unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_corrupt_blob_is_serialization_error() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("custom", "not json").unwrap();
        let autosave = AutoSave::with_key(storage, "custom");
        assert!(matches!(autosave.load(), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let mut autosave = AutoSave::new(storage);
        autosave.save(&Document::new()).unwrap();
        autosave.clear().unwrap();
        assert!(autosave.load().unwrap().is_none());
    }
}
