//! Configuration management for ordersync.
//!
//! # Overview
//!
//! ordersync uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ORDERSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry run
//! - [`CommerceConfig`] - commerce API connection and credentials
//! - [`ExportConfig`] - export format, CSV template, file naming
//! - [`SyncConfig`] - channel and state keys, failure policy
//! - [`StorageConfig`] - destination store (local directory or GCS)
//! - [`LoggingConfig`] - JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [commerce]
//! project_key = "shop"
//! client_id = "${ORDERSYNC_CLIENT_ID}"
//! client_secret = "${ORDERSYNC_CLIENT_SECRET}"
//!
//! [export]
//! export_type = "csv"
//! csv_template = ["id", "orderNumber", "lineItems.sku", "lineItems.quantity"]
//! file_with_timestamp = true
//!
//! [sync]
//! create_sync_actions = true
//! channel_key = "OrderXmlFileExport"
//! target_state_key = "exported"
//!
//! [storage]
//! target = "gcs"
//! path_prefix = "exports"
//!
//! [storage.gcs]
//! bucket = "order-exports"
//! access_token = "${ORDERSYNC_GCS_TOKEN}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CommerceConfig, ExportConfig, ExportType, GcsStorageConfig,
    LocalStorageConfig, LoggingConfig, MatchPolicy, OrderSyncConfig, StorageConfig,
    StorageTarget, SyncConfig,
};
pub use secret::{credential_present, secret_string, SecretString, SecretValue};
