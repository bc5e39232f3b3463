//! Sync artifact
//!
//! The JSON array of sync-intent records written next to the export files,
//! kept for audit and for replaying the reconciliation pass.

use crate::domain::{OrderSyncError, Result, SyncIntentRecord};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;

const ARTIFACT_STEM: &str = "orders_sync";

/// Artifact file name, `orders_sync.json` or `orders_sync_<epoch-ms>.json`
pub fn file_name(with_timestamp: bool, now: DateTime<Utc>) -> String {
    if with_timestamp {
        format!("{ARTIFACT_STEM}_{}.json", now.timestamp_millis())
    } else {
        format!("{ARTIFACT_STEM}.json")
    }
}

/// Serializes records as a pretty-printed JSON array
pub fn encode(records: &[SyncIntentRecord]) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec_pretty(records)?))
}

/// Parses an artifact
///
/// # Errors
///
/// Returns a `Parse` error if the data is not an array of records.
pub fn decode(data: &[u8]) -> Result<Vec<SyncIntentRecord>> {
    serde_json::from_slice(data)
        .map_err(|e| OrderSyncError::Parse(format!("Invalid sync artifact: {e}")))
}

/// Reads and parses an artifact from the local filesystem
pub async fn read_file(path: impl AsRef<Path>) -> Result<Vec<SyncIntentRecord>> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await.map_err(|e| {
        OrderSyncError::Io(format!("Failed to read artifact {}: {e}", path.display()))
    })?;
    decode(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderNumber, ResourceKey};
    use chrono::TimeZone;
    use std::str::FromStr;

    fn record(number: &str) -> SyncIntentRecord {
        SyncIntentRecord::new(
            OrderNumber::from_str(number).unwrap(),
            "exports/orders.csv",
            ResourceKey::from_str("OrderXmlFileExport").unwrap(),
        )
    }

    #[test]
    fn test_file_name() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(file_name(false, now), "orders_sync.json");
        assert_eq!(file_name(true, now), "orders_sync_1700000000123.json");
    }

    #[test]
    fn test_empty_records_encode_to_empty_array() {
        let data = encode(&[]).unwrap();
        assert_eq!(&data[..], b"[]");
        assert!(decode(&data).unwrap().is_empty());
    }

    #[test]
    fn test_decode_encoded_records() {
        let records = vec![record("1001"), record("1002")];
        assert_eq!(decode(&encode(&records).unwrap()).unwrap(), records);
    }

    #[test]
    fn test_decode_rejects_blank_order_number() {
        let data = br#"[{"orderNumber": "", "syncInfo": []}]"#;
        assert!(matches!(decode(data), Err(OrderSyncError::Parse(_))));
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("orders_sync.json");
        std::fs::write(&path, encode(&[record("1001")]).unwrap()).unwrap();

        let records = read_file(&path).await.unwrap();
        assert_eq!(records[0].order_number.as_str(), "1001");
        assert!(read_file(dir.path().join("missing.json")).await.is_err());
    }
}
