//! Run coordinator - main orchestrator for an export and sync run
//!
//! Export, file writes, sync record building, artifact persistence and the
//! reconciliation pass run in that order. Everything before reconciliation
//! is fatal for the run; inside reconciliation failures stay per order.

use crate::adapters::commerce::{
    CommerceClient, CommerceExportSource, ExportData, ExportPayload, ExportSource, OrderDirectory,
};
use crate::adapters::storage::{create_blob_store, read_rows, BlobStore, MemoryBlobStore};
use crate::config::{ExportType, OrderSyncConfig, SyncConfig};
use crate::core::export::artifact;
use crate::core::export::batch::{
    csv_file_name, write_files, xml_file_name, ExportFile, FileWriteReport,
};
use crate::core::export::summary::RunSummary;
use crate::core::sync::{OrderOutcome, ReconcileOptions, Reconciler, SyncContext, SyncRecordBuilder};
use crate::domain::{ExportRow, OrderSyncError, Result, SyncIntentRecord};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Resolves the sync context and reconciles `records`
///
/// # Errors
///
/// Fails without touching any order if the channel or target state cannot be
/// resolved. Per-order failures are reported as outcomes.
pub async fn reconcile_records(
    directory: Arc<dyn OrderDirectory>,
    sync: &SyncConfig,
    records: &[SyncIntentRecord],
    dry_run: bool,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<OrderOutcome>> {
    if records.is_empty() {
        tracing::info!("No sync records, skipping remote updates");
        return Ok(Vec::new());
    }

    let context = SyncContext::resolve(directory, sync).await?;
    let reconciler = Reconciler::new(context, ReconcileOptions::from_config(sync, dry_run))
        .with_shutdown(shutdown);

    tracing::info!(
        records = records.len(),
        concurrency = sync.order_concurrency,
        "Reconciling orders"
    );
    Ok(reconciler.sync_all(records).await)
}

/// Run coordinator
pub struct RunCoordinator {
    config: OrderSyncConfig,
    source: Arc<dyn ExportSource>,
    store: Arc<dyn BlobStore>,
    directory: Arc<dyn OrderDirectory>,
    shutdown: watch::Receiver<bool>,
    run_at: Option<DateTime<Utc>>,
}

impl RunCoordinator {
    /// Create a coordinator from explicit collaborators
    pub fn new(
        config: OrderSyncConfig,
        source: Arc<dyn ExportSource>,
        store: Arc<dyn BlobStore>,
        directory: Arc<dyn OrderDirectory>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            source,
            store,
            directory,
            shutdown,
            run_at: None,
        }
    }

    /// Create a coordinator talking to the configured commerce API and store
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP clients cannot be built.
    pub fn from_config(config: OrderSyncConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let client = Arc::new(CommerceClient::new(config.commerce.clone())?);
        let store = create_blob_store(&config.storage)?;
        let source = Arc::new(CommerceExportSource::new(client.clone()));
        Ok(Self::new(config, source, store, client, shutdown))
    }

    /// Fixes the timestamp used in file names
    pub fn with_run_time(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }

    fn dry_run(&self) -> bool {
        self.config.application.dry_run
    }

    /// Execute the run
    ///
    /// # Errors
    ///
    /// Returns an error if the export, a file write (unless
    /// `continue_on_file_error`), record building, artifact persistence or
    /// sync context resolution fails.
    pub async fn execute(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);
        self.execute_run(run_id.clone()).instrument(span).await
    }

    async fn execute_run(&self, run_id: String) -> Result<RunSummary> {
        let start_time = Instant::now();
        let dry_run = self.dry_run();
        let mut summary = RunSummary::new(run_id, dry_run)
            .with_fail_on_order_error(self.config.sync.fail_on_order_error);
        let now = self.run_at.unwrap_or_else(Utc::now);

        tracing::info!(dry_run, "Starting export run");

        let export = self.source.fetch_unsynced_orders(&self.config.export).await?;
        summary.orders_exported = export.order_count;

        // Dry runs render into memory so records can still be built from the files
        let write_store: Arc<dyn BlobStore> = if dry_run {
            Arc::new(MemoryBlobStore::new())
        } else {
            self.store.clone()
        };

        if !export.any_exported() {
            tracing::info!("No orders to export");
            if self.config.sync.create_sync_actions {
                let path = self.write_artifact(write_store.as_ref(), &[], now).await?;
                summary.artifact_path = Some(path);
            }
            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let files = self.export_files(&export, now);
        tracing::info!(files = files.len(), "Writing export files");

        let report = write_files(
            write_store.as_ref(),
            files,
            self.config.export.file_concurrency,
            self.config.sync.continue_on_file_error,
        )
        .await?;
        summary.files_written = report.written.len();
        summary.file_failures = report.failed.clone();

        if !self.config.sync.create_sync_actions {
            tracing::info!("Sync actions disabled, run complete");
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        let records = self.build_records(write_store.as_ref(), &report).await?;
        summary.records_built = records.len();

        summary.artifact_path = Some(self.write_artifact(write_store.as_ref(), &records, now).await?);

        if self.config.sync.apply_updates {
            let outcomes = reconcile_records(
                self.directory.clone(),
                &self.config.sync,
                &records,
                dry_run,
                self.shutdown.clone(),
            )
            .await?;
            summary.record_outcomes(records.len(), outcomes);
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn write_artifact(
        &self,
        write_store: &dyn BlobStore,
        records: &[SyncIntentRecord],
        now: DateTime<Utc>,
    ) -> Result<String> {
        let path = self
            .config
            .storage
            .object_path(&artifact::file_name(self.config.export.file_with_timestamp, now));
        write_store
            .write(&path, artifact::encode(records)?)
            .await
            .map_err(|e| {
                OrderSyncError::Storage(format!("Failed to persist sync artifact {path}: {e}"))
            })?;
        tracing::info!(path = %path, records = records.len(), "Wrote sync artifact");
        Ok(path)
    }

    fn export_files(&self, export: &ExportData, now: DateTime<Utc>) -> Vec<ExportFile> {
        let with_timestamp = self.config.export.file_with_timestamp;
        let storage = &self.config.storage;

        match &export.payload {
            ExportPayload::Csv(text) => vec![ExportFile {
                path: storage.object_path(&csv_file_name(with_timestamp, now)),
                data: Bytes::from(text.clone()),
                order_number: None,
            }],
            ExportPayload::Xml(documents) => documents
                .iter()
                .map(|doc| ExportFile {
                    path: storage.object_path(&xml_file_name(&doc.order_id, with_timestamp, now)),
                    data: Bytes::from(doc.body.clone()),
                    order_number: doc.order_number.clone(),
                })
                .collect(),
        }
    }

    async fn build_records(
        &self,
        write_store: &dyn BlobStore,
        report: &FileWriteReport,
    ) -> Result<Vec<SyncIntentRecord>> {
        let channel = self
            .config
            .sync
            .channel()
            .map_err(OrderSyncError::Configuration)?;
        let mut builder = SyncRecordBuilder::new(channel);

        match self.config.export.export_type {
            ExportType::Csv => {
                for file in &report.written {
                    let data = write_store.read(&file.path).await?;
                    let location = self.store.location(&file.path);
                    builder.extend(read_rows(&data), &location)?;
                }
            }
            ExportType::Xml => {
                for file in &report.written {
                    if file.order_number.is_none() {
                        tracing::warn!(path = %file.path, "Exported order has no order number");
                    }
                    let row = ExportRow {
                        order_number: file.order_number.clone(),
                    };
                    builder.push(&row, &self.store.location(&file.path))?;
                }
            }
        }

        tracing::info!(records = builder.len(), "Built sync records");
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::{QueryPage, ResourceKind, UpdateResponse, XmlDocument};
    use crate::config::{parse_config, ExportConfig};
    use crate::domain::UpdateAction;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    const CONFIG: &str = r#"
[application]
dry_run = false

[commerce]
project_key = "shop"
access_token = "token"

[export]
export_type = "csv"
csv_template = ["orderNumber", "lineItems.sku"]

[sync]
create_sync_actions = true

[storage]
target = "local"
path_prefix = "exports"

[storage.local]
path = "/tmp/ordersync-unused"
"#;

    struct StaticSource(ExportData);

    #[async_trait]
    impl ExportSource for StaticSource {
        async fn fetch_unsynced_orders(&self, _config: &ExportConfig) -> Result<ExportData> {
            Ok(self.0.clone())
        }
    }

    /// Answers lookups for one channel, one state and order `1001`
    #[derive(Default)]
    struct SingleOrderDirectory {
        updates: Mutex<Vec<UpdateAction>>,
    }

    #[async_trait]
    impl OrderDirectory for SingleOrderDirectory {
        async fn find_by_query(&self, kind: ResourceKind, predicate: &str) -> Result<QueryPage> {
            let results = match (kind, predicate) {
                (ResourceKind::Channel, _) => vec![json!({"id": "channel-1", "key": "k"})],
                (ResourceKind::State, _) => vec![json!({"id": "state-1", "key": "exported"})],
                (ResourceKind::Order, "orderNumber=\"1001\"") => vec![json!({
                    "id": "order-a",
                    "version": 3,
                    "orderNumber": "1001",
                    "lineItems": [{"id": "li-1", "quantity": 1, "state": [
                        {"quantity": 1, "state": {"typeId": "state", "id": "initial"}}
                    ]}]
                })],
                _ => Vec::new(),
            };
            Ok(QueryPage::from_results(results))
        }

        async fn update_order(&self, order_id: &str, update: &UpdateAction) -> Result<UpdateResponse> {
            self.updates.lock().unwrap().push(update.clone());
            Ok(UpdateResponse {
                status: 200,
                body: json!({"id": order_id, "version": update.version + 1}),
            })
        }
    }

    fn csv_export(text: &str, order_count: usize) -> ExportData {
        ExportData {
            payload: ExportPayload::Csv(text.to_string()),
            order_count,
        }
    }

    fn coordinator(
        config: OrderSyncConfig,
        export: ExportData,
        store: MemoryBlobStore,
        directory: Arc<SingleOrderDirectory>,
    ) -> RunCoordinator {
        let (_tx, rx) = watch::channel(false);
        RunCoordinator::new(
            config,
            Arc::new(StaticSource(export)),
            Arc::new(store),
            directory,
            rx,
        )
        .with_run_time(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
    }

    #[tokio::test]
    async fn test_no_orders_writes_empty_artifact_only() {
        let config = parse_config(CONFIG).unwrap();
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n", 0),
            store.clone(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(summary.orders_exported, 0);
        assert_eq!(store.paths(), vec!["exports/orders_sync.json".to_string()]);
        assert_eq!(summary.artifact_path.as_deref(), Some("exports/orders_sync.json"));

        let artifact: Value =
            serde_json::from_slice(&store.get("exports/orders_sync.json").unwrap()).unwrap();
        assert_eq!(artifact, json!([]));
        assert!(summary.outcomes.is_empty());
        assert!(directory.updates.lock().unwrap().is_empty());
        assert!(summary.is_successful());
    }

    #[tokio::test]
    async fn test_no_orders_without_sync_actions_writes_nothing() {
        let mut config = parse_config(CONFIG).unwrap();
        config.sync.create_sync_actions = false;
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(config, csv_export("orderNumber\n", 0), store.clone(), directory)
            .execute()
            .await
            .unwrap();

        assert!(store.paths().is_empty());
        assert!(summary.artifact_path.is_none());
        assert!(summary.is_successful());
    }

    #[tokio::test]
    async fn test_missing_order_does_not_fail_run_by_default() {
        let config = parse_config(CONFIG).unwrap();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n1001,A\n9999,B\n", 2),
            MemoryBlobStore::new(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(summary.orders_synced(), 1);
        assert_eq!(summary.orders_failed(), 1);
        assert_eq!(directory.updates.lock().unwrap().len(), 2);
        assert!(summary.is_successful());
    }

    #[tokio::test]
    async fn test_missing_order_fails_run_when_configured() {
        let mut config = parse_config(CONFIG).unwrap();
        config.sync.fail_on_order_error = true;
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n1001,A\n9999,B\n", 2),
            MemoryBlobStore::new(),
            directory,
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(summary.orders_synced(), 1);
        assert_eq!(summary.orders_failed(), 1);
        assert!(!summary.is_successful());
    }

    #[tokio::test]
    async fn test_csv_run_writes_file_artifact_and_updates() {
        let config = parse_config(CONFIG).unwrap();
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n1001,A\n1001,B\n", 1),
            store.clone(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(
            store.paths(),
            vec!["exports/orders.csv".to_string(), "exports/orders_sync.json".to_string()]
        );
        assert_eq!(summary.records_built, 1);
        assert_eq!(summary.orders_synced(), 1);

        let records = artifact::decode(&store.get("exports/orders_sync.json").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].external_id(), Some("memory://exports/orders.csv"));

        let updates = directory.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].version, 3);
        assert_eq!(updates[1].version, 4);
    }

    #[tokio::test]
    async fn test_sync_actions_disabled_only_writes_files() {
        let mut config = parse_config(CONFIG).unwrap();
        config.sync.create_sync_actions = false;
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n1001,A\n", 1),
            store.clone(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert_eq!(store.paths(), vec!["exports/orders.csv".to_string()]);
        assert_eq!(summary.records_built, 0);
        assert!(directory.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_touches_neither_store_nor_orders() {
        let mut config = parse_config(CONFIG).unwrap();
        config.application.dry_run = true;
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n1001,A\n", 1),
            store.clone(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        assert!(store.paths().is_empty());
        assert!(directory.updates.lock().unwrap().is_empty());
        assert_eq!(summary.orders_planned(), 1);
        assert!(summary.dry_run);
    }

    #[tokio::test]
    async fn test_xml_skipped_file_is_not_synced() {
        let mut config = parse_config(CONFIG).unwrap();
        config.sync.continue_on_file_error = true;
        config.export.export_type = crate::config::ExportType::Xml;
        let store = MemoryBlobStore::new();
        store.fail_writes_to("exports/order-b.xml");
        let directory = Arc::new(SingleOrderDirectory::default());

        let export = ExportData {
            payload: ExportPayload::Xml(vec![
                XmlDocument {
                    order_id: "order-a".to_string(),
                    order_number: Some("1001".to_string()),
                    body: "<order/>".to_string(),
                },
                XmlDocument {
                    order_id: "order-b".to_string(),
                    order_number: Some("1002".to_string()),
                    body: "<order/>".to_string(),
                },
            ]),
            order_count: 2,
        };

        let summary = coordinator(config, export, store.clone(), directory)
            .execute()
            .await
            .unwrap();

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.file_failures.len(), 1);
        assert_eq!(summary.records_built, 1);
        assert_eq!(summary.orders_synced(), 1);
        assert!(!summary.is_successful());
    }

    #[tokio::test]
    async fn test_rows_without_order_numbers_write_empty_artifact() {
        let config = parse_config(CONFIG).unwrap();
        let store = MemoryBlobStore::new();
        let directory = Arc::new(SingleOrderDirectory::default());

        let summary = coordinator(
            config,
            csv_export("orderNumber,lineItems.sku\n,A\n", 1),
            store.clone(),
            directory.clone(),
        )
        .execute()
        .await
        .unwrap();

        let artifact: Value =
            serde_json::from_slice(&store.get("exports/orders_sync.json").unwrap()).unwrap();
        assert_eq!(artifact, json!([]));
        assert!(summary.outcomes.is_empty());
        assert!(directory.updates.lock().unwrap().is_empty());
    }
}
