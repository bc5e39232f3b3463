//! Export command implementation
//!
//! This module implements the `export` command: fetch unsynced orders, write
//! the export files and, when enabled, record the sync on every order.

use super::print_summary;
use crate::config::load_config;
use crate::core::export::RunCoordinator;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - render and plan without writing files or updating orders
    #[arg(long)]
    pub dry_run: bool,

    /// Override the export `where` predicate
    #[arg(long = "where", value_name = "PREDICATE")]
    pub where_predicate: Option<String>,

    /// Write files and the sync artifact but do not update any order
    #[arg(long)]
    pub no_sync: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(predicate) = &self.where_predicate {
            tracing::info!(predicate = %predicate, "Overriding export predicate from CLI");
            config.export.where_predicate = Some(predicate.clone());
        }

        if self.no_sync {
            tracing::info!("Disabling order updates from CLI");
            config.sync.apply_updates = false;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - nothing will be written or updated");
            println!("🔍 DRY RUN MODE - No files will be written and no orders updated");
            println!();
        }

        if !self.yes && !dry_run {
            println!("Export Configuration:");
            println!("  Project: {}", config.commerce.project_key);
            println!("  Format: {}", config.export.export_type);
            println!(
                "  Filter: {}",
                config.export.where_predicate.as_deref().unwrap_or("none")
            );
            println!("  Unsynced only: {}", config.export.export_unsynced_only);
            println!("  Storage: {:?}", config.storage.target);
            println!(
                "  Sync: {}",
                match (config.sync.create_sync_actions, config.sync.apply_updates) {
                    (false, _) => "disabled".to_string(),
                    (true, false) => "artifact only".to_string(),
                    (true, true) => format!(
                        "channel '{}' -> state '{}'",
                        config.sync.channel_key, config.sync.target_state_key
                    ),
                }
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let coordinator = match RunCoordinator::from_config(config, shutdown_signal.clone()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create run coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        println!("🚀 Starting export...");
        println!();

        let summary = match coordinator.execute().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);

        let exit_code = if *shutdown_signal.borrow() {
            println!("⚠️  Export interrupted. Orders not attempted keep empty sync info and are exported again next run.");
            tracing::info!("Export interrupted by user signal");
            130
        } else if summary.is_successful() {
            println!("✅ Export completed successfully!");
            0
        } else {
            println!("⚠️  Export completed with failures");
            1
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs::default();
        assert!(!args.yes);
        assert!(!args.dry_run);
        assert!(!args.no_sync);
        assert!(args.where_predicate.is_none());
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let (_tx, rx) = watch::channel(false);
        let args = ExportArgs {
            yes: true,
            ..Default::default()
        };
        let code = args.execute("does-not-exist.toml", rx).await.unwrap();
        assert_eq!(code, 2);
    }
}
