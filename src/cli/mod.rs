//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for ordersync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Ordersync - order export and sync reconciliation
#[derive(Parser, Debug)]
#[command(name = "ordersync")]
#[command(version, about, long_about = None)]
#[command(author = "Ordersync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ordersync.toml", env = "ORDERSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORDERSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export unsynced orders and record the sync on each of them
    Export(commands::export::ExportArgs),

    /// Reconcile orders from a previously written sync artifact
    Replay(commands::replay::ReplayArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
