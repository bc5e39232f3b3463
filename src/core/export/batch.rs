//! Export file naming and bounded-concurrency writes

use crate::adapters::storage::BlobStore;
use crate::domain::{OrderSyncError, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

/// CSV export file name, `orders.csv` or `orders_<epoch-ms>.csv`
pub fn csv_file_name(with_timestamp: bool, now: DateTime<Utc>) -> String {
    if with_timestamp {
        format!("orders_{}.csv", now.timestamp_millis())
    } else {
        "orders.csv".to_string()
    }
}

/// XML export file name, `<orderId>.xml` or `<orderId>_<epoch-ms>.xml`
pub fn xml_file_name(order_id: &str, with_timestamp: bool, now: DateTime<Utc>) -> String {
    if with_timestamp {
        format!("{order_id}_{}.xml", now.timestamp_millis())
    } else {
        format!("{order_id}.xml")
    }
}

/// A rendered file waiting to be written
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Object path, prefix included
    pub path: String,

    /// File contents
    pub data: Bytes,

    /// Order number of the single order in the file (XML only)
    pub order_number: Option<String>,
}

/// A file that was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Object path
    pub path: String,

    /// Order number of the single order in the file (XML only)
    pub order_number: Option<String>,
}

/// A file that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Object path
    pub path: String,

    /// Error message
    pub reason: String,
}

/// Result of writing a batch of files
#[derive(Debug, Clone, Default)]
pub struct FileWriteReport {
    /// Written files, in input order
    pub written: Vec<WrittenFile>,

    /// Skipped files, in input order
    pub failed: Vec<FileFailure>,
}

/// Writes `files` with at most `concurrency` writes in flight
///
/// Every write completes before the function returns, whatever the outcome
/// of the others.
///
/// # Errors
///
/// Unless `continue_on_error` is set, the first failed file (in input order)
/// fails the whole batch.
pub async fn write_files(
    store: &dyn BlobStore,
    files: Vec<ExportFile>,
    concurrency: usize,
    continue_on_error: bool,
) -> Result<FileWriteReport> {
    let mut results: Vec<(usize, String, Option<String>, Result<()>)> =
        stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| async move {
                let result = store.write(&file.path, file.data).await;
                (index, file.path, file.order_number, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
    results.sort_by_key(|(index, ..)| *index);

    let mut report = FileWriteReport::default();
    for (_, path, order_number, result) in results {
        match result {
            Ok(()) => report.written.push(WrittenFile { path, order_number }),
            Err(e) => {
                if !continue_on_error {
                    return Err(OrderSyncError::Storage(format!(
                        "Failed to write {path}: {e}"
                    )));
                }
                tracing::warn!(path = %path, error = %e, "Skipping file that failed to write");
                report.failed.push(FileFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}
