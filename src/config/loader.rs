//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ExportType, MatchPolicy, OrderSyncConfig, StorageTarget};
use super::secret::secret_string;
use crate::domain::errors::OrderSyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OrderSyncConfig
/// 4. Applies environment variable overrides (ORDERSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ordersync::config::loader::load_config;
///
/// let config = load_config("ordersync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OrderSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OrderSyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        OrderSyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration from a TOML string
///
/// Performs the same substitution, override and validation steps as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<OrderSyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: OrderSyncConfig = toml::from_str(&contents)
        .map_err(|e| OrderSyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        OrderSyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| OrderSyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(OrderSyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse().map_err(|_| {
        OrderSyncError::Configuration(format!("Invalid value '{val}' for environment variable {name}"))
    })
}

fn parse_enum_override<T: serde::de::DeserializeOwned>(name: &str, val: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(val.to_lowercase())).map_err(|_| {
        OrderSyncError::Configuration(format!("Invalid value '{val}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using ORDERSYNC_* prefix
///
/// Environment variables follow the pattern: ORDERSYNC_<SECTION>_<KEY>
/// For example: ORDERSYNC_COMMERCE_PROJECT_KEY, ORDERSYNC_EXPORT_EXPORT_TYPE
fn apply_env_overrides(config: &mut OrderSyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("ORDERSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("ORDERSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("ORDERSYNC_APPLICATION_DRY_RUN", &val)?;
    }

    // Commerce overrides
    if let Some(val) = var("ORDERSYNC_COMMERCE_PROJECT_KEY") {
        config.commerce.project_key = val;
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_API_URL") {
        config.commerce.api_url = val;
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_AUTH_URL") {
        config.commerce.auth_url = val;
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_CLIENT_ID") {
        config.commerce.client_id = Some(val);
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_CLIENT_SECRET") {
        config.commerce.client_secret = Some(secret_string(val));
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_ACCESS_TOKEN") {
        config.commerce.access_token = Some(secret_string(val));
    }
    if let Some(val) = var("ORDERSYNC_COMMERCE_PER_PAGE") {
        config.commerce.per_page = parse_override("ORDERSYNC_COMMERCE_PER_PAGE", &val)?;
    }

    // Export overrides
    if let Some(val) = var("ORDERSYNC_EXPORT_EXPORT_TYPE") {
        config.export.export_type =
            parse_enum_override::<ExportType>("ORDERSYNC_EXPORT_EXPORT_TYPE", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_EXPORT_WHERE") {
        config.export.where_predicate = Some(val);
    }
    if let Some(val) = var("ORDERSYNC_EXPORT_FILE_WITH_TIMESTAMP") {
        config.export.file_with_timestamp =
            parse_override("ORDERSYNC_EXPORT_FILE_WITH_TIMESTAMP", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_EXPORT_FILE_CONCURRENCY") {
        config.export.file_concurrency =
            parse_override("ORDERSYNC_EXPORT_FILE_CONCURRENCY", &val)?;
    }

    // Sync overrides
    if let Some(val) = var("ORDERSYNC_SYNC_CREATE_SYNC_ACTIONS") {
        config.sync.create_sync_actions =
            parse_override("ORDERSYNC_SYNC_CREATE_SYNC_ACTIONS", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_APPLY_UPDATES") {
        config.sync.apply_updates = parse_override("ORDERSYNC_SYNC_APPLY_UPDATES", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_CHANNEL_KEY") {
        config.sync.channel_key = val;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_TARGET_STATE_KEY") {
        config.sync.target_state_key = val;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_CONTINUE_ON_ORDER_ERROR") {
        config.sync.continue_on_order_error =
            parse_override("ORDERSYNC_SYNC_CONTINUE_ON_ORDER_ERROR", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_FAIL_ON_ORDER_ERROR") {
        config.sync.fail_on_order_error =
            parse_override("ORDERSYNC_SYNC_FAIL_ON_ORDER_ERROR", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_SYNC_MATCH_POLICY") {
        config.sync.match_policy =
            parse_enum_override::<MatchPolicy>("ORDERSYNC_SYNC_MATCH_POLICY", &val)?;
    }

    // Storage overrides
    if let Some(val) = var("ORDERSYNC_STORAGE_TARGET") {
        config.storage.target =
            parse_enum_override::<StorageTarget>("ORDERSYNC_STORAGE_TARGET", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_STORAGE_PATH_PREFIX") {
        config.storage.path_prefix = val;
    }
    if let Some(ref mut gcs) = config.storage.gcs {
        if let Some(val) = var("ORDERSYNC_STORAGE_GCS_BUCKET") {
            gcs.bucket = val;
        }
        if let Some(val) = var("ORDERSYNC_STORAGE_GCS_ACCESS_TOKEN") {
            gcs.access_token = secret_string(val);
        }
    }

    // Logging overrides
    if let Some(val) = var("ORDERSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("ORDERSYNC_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("ORDERSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
