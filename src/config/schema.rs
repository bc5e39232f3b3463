//! Configuration schema types
//!
//! This module defines the configuration structure that maps to
//! `ordersync.toml`.

use crate::adapters::commerce::render::CsvColumn;
use crate::config::secret::credential_present;
use crate::config::SecretString;
use crate::domain::ids::ResourceKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main ordersync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Commerce API connection
    pub commerce: CommerceConfig,

    /// Export rendering settings
    pub export: ExportConfig,

    /// Sync record and state transition settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Destination of the exported files
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OrderSyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.commerce.validate()?;
        self.export.validate()?;
        self.sync.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (no blob writes, no order updates)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Commerce API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Project key, the first path segment of every API call
    pub project_key: String,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// OAuth base URL
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// OAuth client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub client_secret: Option<SecretString>,

    /// Pre-issued access token; skips the client-credentials flow when set
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// OAuth scopes requested with the client-credentials grant
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Number of orders fetched per page
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl CommerceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.project_key.trim().is_empty() {
            return Err("commerce.project_key cannot be empty".to_string());
        }

        for (name, url) in [("api_url", &self.api_url), ("auth_url", &self.auth_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "commerce.{name} must start with http:// or https://"
                ));
            }
        }

        if !credential_present(self.access_token.as_ref()) {
            if self.client_id.as_ref().map(|s| s.is_empty()).unwrap_or(true) {
                return Err(
                    "commerce.client_id cannot be empty when no access_token is given".to_string(),
                );
            }
            if !credential_present(self.client_secret.as_ref()) {
                return Err(
                    "commerce.client_secret cannot be empty when no access_token is given"
                        .to_string(),
                );
            }
        }

        if !(1..=500).contains(&self.per_page) {
            return Err(format!(
                "commerce.per_page must be between 1 and 500, got {}",
                self.per_page
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("commerce.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            project_key: String::new(),
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            client_id: None,
            client_secret: None,
            access_token: None,
            scopes: Vec::new(),
            timeout_seconds: default_timeout_seconds(),
            per_page: default_per_page(),
        }
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    /// One CSV file for the whole run
    Csv,
    /// One XML document per order
    Xml,
}

impl std::fmt::Display for ExportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportType::Csv => write!(f, "csv"),
            ExportType::Xml => write!(f, "xml"),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export file format
    #[serde(default = "default_export_type")]
    pub export_type: ExportType,

    /// CSV columns, in output order (required for csv)
    #[serde(default)]
    pub csv_template: Vec<String>,

    /// Repeat order-level columns on every line item row
    #[serde(default)]
    pub fill_all_rows: bool,

    /// Only export orders that carry no sync info yet
    #[serde(default = "default_true")]
    pub export_unsynced_only: bool,

    /// Additional query predicate used to filter exported orders
    #[serde(default, rename = "where")]
    pub where_predicate: Option<String>,

    /// Append an epoch-millisecond timestamp to file names
    #[serde(default)]
    pub file_with_timestamp: bool,

    /// Shipping method name used when an order has none
    #[serde(default = "default_standard_shipping_method")]
    pub standard_shipping_method: String,

    /// Maximum concurrent file writes
    #[serde(default = "default_file_concurrency")]
    pub file_concurrency: usize,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.export_type == ExportType::Csv {
            if self.csv_template.is_empty() {
                return Err(
                    "export.csv_template cannot be empty when export_type is 'csv'".to_string(),
                );
            }
            for column in &self.csv_template {
                CsvColumn::from_str(column)?;
            }
        }

        if self.file_concurrency == 0 || self.file_concurrency > 50 {
            return Err(format!(
                "export.file_concurrency must be between 1 and 50, got {}",
                self.file_concurrency
            ));
        }

        Ok(())
    }

    /// Parsed CSV template columns
    pub fn csv_columns(&self) -> Result<Vec<CsvColumn>, String> {
        self.csv_template
            .iter()
            .map(|c| CsvColumn::from_str(c))
            .collect()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_type: default_export_type(),
            csv_template: Vec::new(),
            fill_all_rows: false,
            export_unsynced_only: true,
            where_predicate: None,
            file_with_timestamp: false,
            standard_shipping_method: default_standard_shipping_method(),
            file_concurrency: default_file_concurrency(),
        }
    }
}

/// How lookups treat queries that return more than one result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Use the first result
    #[default]
    First,
    /// Fail with an ambiguous-match error
    Unique,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Build sync-intent records and persist the `orders_sync*.json` artifact
    #[serde(default)]
    pub create_sync_actions: bool,

    /// Submit sync-info and state transition updates for each record
    #[serde(default = "default_true")]
    pub apply_updates: bool,

    /// Key of the channel recorded in sync info
    #[serde(default = "default_channel_key")]
    pub channel_key: String,

    /// Key of the state every line item is transitioned to
    #[serde(default = "default_target_state_key")]
    pub target_state_key: String,

    /// Keep processing the remaining orders after one fails
    #[serde(default = "default_true")]
    pub continue_on_order_error: bool,

    /// Report the run as failed when any order fails to sync
    #[serde(default)]
    pub fail_on_order_error: bool,

    /// Skip files that fail to upload instead of aborting the run
    #[serde(default)]
    pub continue_on_file_error: bool,

    /// Policy for lookups returning several results
    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Maximum number of orders reconciled concurrently
    #[serde(default = "default_order_concurrency")]
    pub order_concurrency: usize,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        ResourceKey::from_str(&self.channel_key)
            .map_err(|e| format!("sync.channel_key is invalid: {e}"))?;
        ResourceKey::from_str(&self.target_state_key)
            .map_err(|e| format!("sync.target_state_key is invalid: {e}"))?;

        if self.order_concurrency == 0 || self.order_concurrency > 16 {
            return Err(format!(
                "sync.order_concurrency must be between 1 and 16, got {}",
                self.order_concurrency
            ));
        }

        Ok(())
    }

    /// Channel key as a typed key
    pub fn channel(&self) -> Result<ResourceKey, String> {
        ResourceKey::from_str(&self.channel_key)
    }

    /// Target state key as a typed key
    pub fn target_state(&self) -> Result<ResourceKey, String> {
        ResourceKey::from_str(&self.target_state_key)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            create_sync_actions: false,
            apply_updates: true,
            channel_key: default_channel_key(),
            target_state_key: default_target_state_key(),
            continue_on_order_error: true,
            fail_on_order_error: false,
            continue_on_file_error: false,
            match_policy: MatchPolicy::First,
            order_concurrency: default_order_concurrency(),
        }
    }
}

/// Storage target selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTarget {
    /// Local directory
    Local,
    /// Google Cloud Storage bucket
    Gcs,
}

/// Destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which store receives the files
    pub target: StorageTarget,

    /// Prefix prepended to every file name (e.g. `exports/orders`)
    #[serde(default)]
    pub path_prefix: String,

    /// Local directory settings (required if target = local)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalStorageConfig>,

    /// GCS settings (required if target = gcs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs: Option<GcsStorageConfig>,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path_prefix.starts_with('/') {
            return Err("storage.path_prefix must be relative".to_string());
        }

        // Only the active target's section is validated
        match self.target {
            StorageTarget::Local => match &self.local {
                Some(local) => local.validate(),
                None => Err("storage.local is required when target = 'local'".to_string()),
            },
            StorageTarget::Gcs => match &self.gcs {
                Some(gcs) => gcs.validate(),
                None => Err("storage.gcs is required when target = 'gcs'".to_string()),
            },
        }
    }

    /// Joins the configured prefix and a file name
    pub fn object_path(&self, file_name: &str) -> String {
        let prefix = self.path_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        }
    }
}

/// Local directory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory; created if missing
    pub path: String,
}

impl LocalStorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("storage.local.path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Google Cloud Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsStorageConfig {
    /// Bucket name
    pub bucket: String,

    /// OAuth access token with write access to the bucket
    /// Stored securely in memory and automatically zeroized on drop
    pub access_token: SecretString,

    /// JSON API endpoint
    #[serde(default = "default_gcs_endpoint")]
    pub endpoint: String,
}

impl GcsStorageConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.bucket.trim().is_empty() {
            return Err("storage.gcs.bucket cannot be empty".to_string());
        }
        if self.access_token.expose_secret().is_blank() {
            return Err("storage.gcs.access_token cannot be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("storage.gcs.endpoint must start with http:// or https://".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.europe-west1.gcp.commercetools.com".to_string()
}

fn default_auth_url() -> String {
    "https://auth.europe-west1.gcp.commercetools.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_per_page() -> usize {
    100
}

fn default_export_type() -> ExportType {
    ExportType::Csv
}

fn default_standard_shipping_method() -> String {
    "None".to_string()
}

fn default_file_concurrency() -> usize {
    10
}

fn default_channel_key() -> String {
    "OrderXmlFileExport".to_string()
}

fn default_target_state_key() -> String {
    "exported".to_string()
}

fn default_order_concurrency() -> usize {
    1
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
