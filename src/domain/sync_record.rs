//! Export rows and sync-intent records
//!
//! A [`SyncIntentRecord`] states that an order was written to a given export
//! file for a given channel. Records are built once per run, serialized to the
//! `orders_sync*.json` artifact for audit and replay, and consumed by the
//! reconciliation pass.

use crate::domain::ids::{OrderNumber, ResourceKey};
use serde::{Deserialize, Serialize};

/// One parsed row of the exported CSV
///
/// Only the order number matters here; every other column is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExportRow {
    /// Value of the `orderNumber` column, if the column exists and is non-empty
    #[serde(rename = "orderNumber", default)]
    pub order_number: Option<String>,
}

impl ExportRow {
    /// Creates a row carrying the given order number
    pub fn with_order_number(order_number: impl Into<String>) -> Self {
        Self {
            order_number: Some(order_number.into()),
        }
    }
}

/// Sync metadata entry of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncInfoEntry {
    /// Location of the export file the order was written to
    pub external_id: String,

    /// Channel key the order was exported through
    pub channel: ResourceKey,
}

/// Intent to mark one order as exported
///
/// Serializes as
/// `{"orderNumber": "...", "syncInfo": [{"externalId": "...", "channel": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncIntentRecord {
    /// Business-facing order number
    pub order_number: OrderNumber,

    /// Sync metadata, one entry per channel
    pub sync_info: Vec<SyncInfoEntry>,
}

impl SyncIntentRecord {
    /// Creates a record with a single sync-info entry
    pub fn new(order_number: OrderNumber, external_id: impl Into<String>, channel: ResourceKey) -> Self {
        Self {
            order_number,
            sync_info: vec![SyncInfoEntry {
                external_id: external_id.into(),
                channel,
            }],
        }
    }

    /// External id of the first sync-info entry
    pub fn external_id(&self) -> Option<&str> {
        self.sync_info.first().map(|s| s.external_id.as_str())
    }
}
