//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with span context
//! - JSON-formatted rolling log files
//! - `RUST_LOG` filter overrides
//!
//! # Example
//!
//! ```no_run
//! use ordersync::logging::init_logging;
//! use ordersync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ordersync::log_error_with_context;
/// use ordersync::domain::OrderSyncError;
///
/// let error = OrderSyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
