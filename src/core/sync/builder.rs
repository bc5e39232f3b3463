//! Sync-intent record builder
//!
//! Turns a stream of export rows into one [`SyncIntentRecord`] per distinct
//! order number, in first-occurrence order.

use super::dedup::DedupIndex;
use crate::domain::{ExportRow, OrderNumber, OrderSyncError, ResourceKey, Result, SyncIntentRecord};

/// Builds sync-intent records for a channel
#[derive(Debug)]
pub struct SyncRecordBuilder {
    channel: ResourceKey,
    dedup: DedupIndex,
    records: Vec<SyncIntentRecord>,
}

impl SyncRecordBuilder {
    /// Creates a builder recording `channel` in every record
    pub fn new(channel: ResourceKey) -> Self {
        Self {
            channel,
            dedup: DedupIndex::new(),
            records: Vec::new(),
        }
    }

    /// Adds one row exported to `external_id`
    ///
    /// Returns `true` if the row produced a new record. Rows without an
    /// order number and repeats of an earlier order number are dropped.
    pub fn push(&mut self, row: &ExportRow, external_id: &str) -> Result<bool> {
        if !self.dedup.observe(row.order_number.as_deref()) {
            return Ok(false);
        }

        let raw = row.order_number.as_deref().unwrap_or_default().trim();
        let order_number = OrderNumber::new(raw).map_err(OrderSyncError::Parse)?;
        self.records.push(SyncIntentRecord::new(
            order_number,
            external_id,
            self.channel.clone(),
        ));
        Ok(true)
    }

    /// Consumes a row stream whose rows were all exported to `external_id`
    ///
    /// # Errors
    ///
    /// The first error yielded by `rows` aborts the build and is returned.
    pub fn extend<I>(&mut self, rows: I, external_id: &str) -> Result<()>
    where
        I: IntoIterator<Item = Result<ExportRow>>,
    {
        for row in rows {
            self.push(&row?, external_id)?;
        }
        Ok(())
    }

    /// Records built so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no record was built
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records in first-occurrence order
    pub fn finish(self) -> Vec<SyncIntentRecord> {
        self.records
    }

    /// Builds records from a single row stream
    pub fn build<I>(channel: ResourceKey, rows: I, external_id: &str) -> Result<Vec<SyncIntentRecord>>
    where
        I: IntoIterator<Item = Result<ExportRow>>,
    {
        let mut builder = Self::new(channel);
        builder.extend(rows, external_id)?;
        Ok(builder.finish())
    }
}
