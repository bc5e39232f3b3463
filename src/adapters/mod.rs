//! External system integrations for ordersync.
//!
//! - [`commerce`] - commerce API: order export, lookups and versioned updates
//! - [`storage`] - blob stores receiving export files and sync artifacts
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits
//! ([`commerce::OrderDirectory`], [`commerce::ExportSource`],
//! [`storage::BlobStore`]) so the reconciliation logic can be driven by
//! in-memory implementations in tests.
//!
//! ```rust,no_run
//! use ordersync::adapters::commerce::{CommerceClient, CommerceExportSource};
//! use ordersync::config::load_config;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ordersync.toml")?;
//! let client = Arc::new(CommerceClient::new(config.commerce.clone())?);
//! let source = CommerceExportSource::new(client.clone());
//! # Ok(())
//! # }
//! ```

pub mod commerce;
pub mod storage;
