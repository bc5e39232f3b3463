//! Local directory blob store

use super::traits::{validate_path, BlobStore};
use crate::domain::{OrderSyncError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

/// Blob store writing files below a root directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let full_path = self.full_path(path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                OrderSyncError::Storage(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        tokio::fs::write(&full_path, &data).await.map_err(|e| {
            OrderSyncError::Storage(format!("Failed to write {}: {e}", full_path.display()))
        })?;

        tracing::debug!(path = %full_path.display(), bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let full_path = self.full_path(path)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OrderSyncError::not_found("file", full_path.display().to_string()))
            }
            Err(e) => Err(OrderSyncError::Storage(format!(
                "Failed to read {}: {e}",
                full_path.display()
            ))),
        }
    }

    fn location(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store
            .write("exports/2024/orders.csv", Bytes::from("orderNumber\n"))
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("exports/2024/orders.csv")).unwrap();
        assert_eq!(on_disk, "orderNumber\n");
        assert_eq!(
            store.read("exports/2024/orders.csv").await.unwrap(),
            Bytes::from("orderNumber\n")
        );
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(store.read("nope.csv").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let result = store.write("../outside.csv", Bytes::from("x")).await;
        assert!(matches!(result, Err(OrderSyncError::Storage(_))));
    }

    #[test]
    fn test_location_is_full_path() {
        let store = LocalBlobStore::new("/data/out");
        assert_eq!(store.location("orders.csv"), "/data/out/orders.csv");
    }
}
