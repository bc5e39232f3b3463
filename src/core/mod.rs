//! Core business logic for ordersync.
//!
//! # Modules
//!
//! - [`export`] - Run orchestration, file writes, artifact and summary
//! - [`sync`] - Sync-intent records and per-order reconciliation
//!
//! # Run Workflow
//!
//! 1. **Export**: Fetch unsynced orders and render them as CSV or XML
//! 2. **Write**: Store the rendered files with bounded concurrency
//! 3. **Build**: Derive one sync-intent record per distinct order number
//! 4. **Persist**: Write the `orders_sync*.json` artifact
//! 5. **Reconcile**: Record sync info and transition line items per order
//! 6. **Report**: Log the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use ordersync::config::load_config;
//! use ordersync::core::export::RunCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ordersync.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = RunCoordinator::from_config(config, shutdown_rx)?;
//! let summary = coordinator.execute().await?;
//!
//! println!("Exported: {}", summary.orders_exported);
//! println!("Synced: {}", summary.orders_synced());
//! println!("Failed: {}", summary.orders_failed());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod sync;
