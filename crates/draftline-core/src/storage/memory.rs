//! Process-local [`Storage`] backed by a map.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// Volatile storage, used by tests and as the default session backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<String> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set("test", "{}").unwrap();
        assert_eq!(storage.get("test").unwrap(), "{}");
        storage.set("test", "[]").unwrap();
        assert_eq!(storage.get("test").unwrap(), "[]");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.get("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_contains_and_remove() {
        let storage = MemoryStorage::new();
        assert!(!storage.contains("test").unwrap());
        storage.set("test", "x").unwrap();
        assert!(storage.contains("test").unwrap());
        storage.remove("test").unwrap();
        assert!(!storage.contains("test").unwrap());
        storage.remove("test").unwrap();
        assert!(storage.is_empty());
    }
}
