//! Blob store factory
//!
//! Creates the blob store selected by `storage.target`.

use super::gcs::GcsBlobStore;
use super::local::LocalBlobStore;
use super::traits::BlobStore;
use crate::config::{StorageConfig, StorageTarget};
use crate::domain::{OrderSyncError, Result};
use std::sync::Arc;

/// Create a blob store based on the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the section for the selected target is
/// missing or the client cannot be built.
pub fn create_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    match config.target {
        StorageTarget::Local => {
            let local = config.local.as_ref().ok_or_else(|| {
                OrderSyncError::Configuration(
                    "storage.local is required when target = 'local'".to_string(),
                )
            })?;
            tracing::info!(path = %local.path, "Using local blob store");
            Ok(Arc::new(LocalBlobStore::new(&local.path)))
        }
        StorageTarget::Gcs => {
            let gcs = config.gcs.as_ref().ok_or_else(|| {
                OrderSyncError::Configuration(
                    "storage.gcs is required when target = 'gcs'".to_string(),
                )
            })?;
            tracing::info!(bucket = %gcs.bucket, "Using GCS blob store");
            Ok(Arc::new(GcsBlobStore::new(gcs)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalStorageConfig;

    #[test]
    fn test_create_local_store() {
        let config = StorageConfig {
            target: StorageTarget::Local,
            path_prefix: String::new(),
            local: Some(LocalStorageConfig {
                path: "/tmp/ordersync".to_string(),
            }),
            gcs: None,
        };
        let store = create_blob_store(&config).unwrap();
        assert_eq!(store.location("orders.csv"), "/tmp/ordersync/orders.csv");
    }

    #[test]
    fn test_missing_gcs_section() {
        let config = StorageConfig {
            target: StorageTarget::Gcs,
            path_prefix: String::new(),
            local: None,
            gcs: None,
        };
        assert!(matches!(
            create_blob_store(&config),
            Err(OrderSyncError::Configuration(_))
        ));
    }
}
