//! In-memory blob store

use super::traits::{validate_path, BlobStore};
use crate::domain::{OrderSyncError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

/// Blob store keeping objects in memory
///
/// Used by dry runs to hold rendered files and by tests. Writes to paths
/// registered with [`MemoryBlobStore::fail_writes_to`] fail with a `Storage`
/// error.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `path` fail
    pub fn fail_writes_to(&self, path: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(path.into());
        }
    }

    /// Paths currently stored, sorted
    pub fn paths(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Contents of `path`, if present
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(path).cloned())
    }
}

fn poisoned() -> OrderSyncError {
    OrderSyncError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        validate_path(path)?;

        if self.failing.read().map_err(|_| poisoned())?.contains(path) {
            return Err(OrderSyncError::Storage(format!("Write rejected: {path}")));
        }

        self.objects
            .write()
            .map_err(|_| poisoned())?
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        self.objects
            .read()
            .map_err(|_| poisoned())?
            .get(path)
            .cloned()
            .ok_or_else(|| OrderSyncError::not_found("object", path))
    }

    fn location(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let store = MemoryBlobStore::new();
        store
            .write("exports/orders.csv", Bytes::from("orderNumber\n1001\n"))
            .await
            .unwrap();

        let data = store.read("exports/orders.csv").await.unwrap();
        assert_eq!(data, Bytes::from("orderNumber\n1001\n"));
        assert_eq!(store.paths(), vec!["exports/orders.csv".to_string()]);
        assert_eq!(store.location("exports/orders.csv"), "memory://exports/orders.csv");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.read("missing.csv").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = MemoryBlobStore::new();
        store.fail_writes_to("a.xml");

        assert!(store.write("a.xml", Bytes::from("x")).await.is_err());
        assert!(store.write("b.xml", Bytes::from("x")).await.is_ok());
        assert!(store.get("a.xml").is_none());
    }
}
