//! Blob store abstraction
//!
//! Export files and the sync artifact are written through a [`BlobStore`].
//! The store also reports the external location of a path, which is recorded
//! as the `externalId` of sync info.

use crate::domain::{ExportRow, OrderSyncError, Result};
use async_trait::async_trait;
use bytes::Bytes;

/// Destination for exported files
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `data` to `path`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns a `Storage` or `Transport` error if the write fails.
    async fn write(&self, path: &str, data: Bytes) -> Result<()>;

    /// Reads the object at `path`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing was written at `path`.
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// External location of `path` (e.g. `gs://bucket/exports/orders.csv`)
    fn location(&self, path: &str) -> String;
}

/// Parses CSV data into export rows
///
/// Keys are taken from the header row. Rows are parsed lazily; a malformed
/// record yields a `Parse` error at its position in the sequence.
pub fn read_rows(data: &[u8]) -> impl Iterator<Item = Result<ExportRow>> + '_ {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data)
        .into_deserialize::<ExportRow>()
        .map(|row| row.map_err(OrderSyncError::from))
}

/// Rejects absolute paths and parent directory components
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OrderSyncError::Storage("Object path cannot be empty".to_string()));
    }
    if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
        return Err(OrderSyncError::Storage(format!(
            "Object path must be relative without '..': {path}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows_uses_header_keys() {
        let data = b"id,orderNumber\na,1001\nb,1001\nc,1002\n";
        let rows: Vec<ExportRow> = read_rows(data).map(|r| r.unwrap()).collect();
        assert_eq!(
            rows,
            vec![
                ExportRow::with_order_number("1001"),
                ExportRow::with_order_number("1001"),
                ExportRow::with_order_number("1002"),
            ]
        );
    }

    #[test]
    fn test_read_rows_trims_padded_cells() {
        let data = b"orderNumber,sku\n 1001 ,A\n1001,B\n";
        let rows: Vec<ExportRow> = read_rows(data).map(|r| r.unwrap()).collect();
        assert_eq!(rows[0], ExportRow::with_order_number("1001"));
        assert_eq!(rows[0], rows[1]);
    }

    #[test]
    fn test_read_rows_empty_input() {
        assert_eq!(read_rows(b"").count(), 0);
        assert_eq!(read_rows(b"orderNumber\n").count(), 0);
    }

    #[test]
    fn test_read_rows_malformed_record() {
        let data = b"orderNumber,sku\n1001,A\n1002\n";
        let rows: Vec<Result<ExportRow>> = read_rows(data).collect();
        assert!(rows[0].is_ok());
        assert!(matches!(rows[1], Err(OrderSyncError::Parse(_))));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("exports/orders.csv").is_ok());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("exports/../secret").is_err());
        assert!(validate_path("").is_err());
    }
}
