//! Domain error types
//!
//! This module defines the error hierarchy for ordersync. Lookup, update and
//! transport failures are kept apart so the run coordinator can decide which
//! ones are fatal for the whole run and which only fail a single order.
//! Errors never expose third-party types.

use thiserror::Error;

/// Main ordersync error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum OrderSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A filtered lookup yielded zero results
    #[error("{resource} not found: {key}")]
    NotFound {
        /// Kind of remote resource that was queried (channel, state, order)
        resource: String,
        /// The identifier that was looked up
        key: String,
    },

    /// A filtered lookup yielded more than one result under the `unique` match policy
    #[error("{resource} lookup for '{key}' matched {count} results")]
    AmbiguousMatch {
        /// Kind of remote resource that was queried
        resource: String,
        /// The identifier that was looked up
        key: String,
        /// Number of matches reported by the remote system
        count: u64,
    },

    /// The remote system answered an update with a non-success status
    #[error("Remote update rejected with status {status}: {message}")]
    RemoteUpdate {
        /// HTTP status returned by the remote system
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Network or API transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed export data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Blob store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl OrderSyncError {
    /// Builds a `NotFound` error for the given resource kind and key
    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        OrderSyncError::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Returns true for lookups that yielded zero results
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderSyncError::NotFound { .. })
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for OrderSyncError {
    fn from(err: std::io::Error) -> Self {
        OrderSyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for OrderSyncError {
    fn from(err: serde_json::Error) -> Self {
        OrderSyncError::Serialization(err.to_string())
    }
}

// A broken CSV stream is a parse failure of the export, not an I/O failure
impl From<csv::Error> for OrderSyncError {
    fn from(err: csv::Error) -> Self {
        OrderSyncError::Parse(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for OrderSyncError {
    fn from(err: toml::de::Error) -> Self {
        OrderSyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrderSyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_not_found_preserves_key() {
        let err = OrderSyncError::not_found("channel", "OrderXmlFileExport");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "channel not found: OrderXmlFileExport");

        match err {
            OrderSyncError::NotFound { resource, key } => {
                assert_eq!(resource, "channel");
                assert_eq!(key, "OrderXmlFileExport");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_update_display() {
        let err = OrderSyncError::RemoteUpdate {
            status: 409,
            message: "version mismatch".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote update rejected with status 409: version mismatch"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: OrderSyncError = io_err.into();
        assert!(matches!(err, OrderSyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: OrderSyncError = json_err.into();
        assert!(matches!(err, OrderSyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: OrderSyncError = toml_err.into();
        assert!(matches!(err, OrderSyncError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = OrderSyncError::Transport("connection reset".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
