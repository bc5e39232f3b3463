//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the ordersync configuration file.

use crate::config::{load_config, StorageTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Project: {}", config.commerce.project_key);
        println!("  API URL: {}", config.commerce.api_url);
        println!(
            "  Authentication: {}",
            if config.commerce.access_token.is_some() {
                "static access token"
            } else {
                "client credentials"
            }
        );
        println!("  Export Type: {}", config.export.export_type);
        if !config.export.csv_template.is_empty() {
            println!("  CSV Columns: {}", config.export.csv_template.join(", "));
        }
        println!("  Unsynced Only: {}", config.export.export_unsynced_only);

        match config.storage.target {
            StorageTarget::Local => {
                if let Some(local) = &config.storage.local {
                    println!("  Storage: local ({})", local.path);
                }
            }
            StorageTarget::Gcs => {
                if let Some(gcs) = &config.storage.gcs {
                    println!("  Storage: gcs (bucket {})", gcs.bucket);
                }
            }
        }
        if !config.storage.path_prefix.is_empty() {
            println!("  Path Prefix: {}", config.storage.path_prefix);
        }

        println!("  Create Sync Actions: {}", config.sync.create_sync_actions);
        println!("  Apply Updates: {}", config.sync.apply_updates);
        println!("  Channel Key: {}", config.sync.channel_key);
        println!("  Target State Key: {}", config.sync.target_state_key);
        println!("  Match Policy: {:?}", config.sync.match_policy);
        println!("  Fail On Order Error: {}", config.sync.fail_on_order_error);
        println!("  Order Concurrency: {}", config.sync.order_concurrency);
        println!();
        Ok(0)
    }
}
