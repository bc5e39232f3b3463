// Ordersync - Order Export and Sync Reconciliation
// Copyright (c) 2025 Ordersync Contributors
// Licensed under the MIT License

//! # Ordersync - Order Export and Sync Reconciliation
//!
//! Ordersync exports unsynced orders from a commerce platform to files and
//! records on every exported order that it was exported: a sync-info entry
//! for the export channel and a transition of all line items to a target
//! state.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Exporting** orders without sync info as CSV or per-order XML
//! - **Writing** the files to a local directory or a GCS bucket
//! - **Building** one sync-intent record per distinct order number
//! - **Reconciling** each order with two versioned updates
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Run orchestration and the reconciliation engine
//! - [`adapters`] - External integrations (commerce API, blob stores)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ordersync::config::load_config;
//! use ordersync::core::export::RunCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ordersync.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = RunCoordinator::from_config(config, shutdown_rx)?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Synced {} orders", summary.orders_synced());
//!     Ok(())
//! }
//! ```
//!
//! ## Reconciliation
//!
//! Every order moves through
//! `Located -> SyncInfoPlanned -> SyncInfoApplied -> TransitionPlanned -> TransitionApplied`.
//! The transition is submitted with the located version plus one. A failure
//! ends that order only:
//!
//! ```rust,no_run
//! use ordersync::core::sync::{OrderOutcome, ReconcileOptions, Reconciler, SyncContext};
//! # use ordersync::adapters::commerce::OrderDirectory;
//! # use ordersync::config::SyncConfig;
//! # use ordersync::domain::SyncIntentRecord;
//! # use std::sync::Arc;
//!
//! # async fn example(
//! #     directory: Arc<dyn OrderDirectory>,
//! #     records: Vec<SyncIntentRecord>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let sync = SyncConfig::default();
//! let context = SyncContext::resolve(directory, &sync).await?;
//! let reconciler = Reconciler::new(context, ReconcileOptions::from_config(&sync, false));
//!
//! for outcome in reconciler.sync_all(&records).await {
//!     if let OrderOutcome::Failed { order_number, stage, reason } = outcome {
//!         eprintln!("{order_number} failed at {stage}: {reason}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`] with
//! [`domain::OrderSyncError`]:
//!
//! ```rust,no_run
//! use ordersync::domain::OrderSyncError;
//!
//! fn example() -> Result<(), OrderSyncError> {
//!     let config = ordersync::config::load_config("ordersync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
