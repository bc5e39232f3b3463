//! Replay command implementation
//!
//! Re-runs the reconciliation pass from a previously written sync artifact.

use super::print_summary;
use crate::adapters::commerce::CommerceClient;
use crate::config::load_config;
use crate::core::export::{artifact, reconcile_records, RunSummary};
use clap::Args;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Arguments for the replay command
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to an `orders_sync*.json` artifact
    #[arg(short, long)]
    pub artifact: String,

    /// Plan updates without submitting them
    #[arg(long)]
    pub dry_run: bool,
}

impl ReplayArgs {
    /// Execute the replay command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(artifact = %self.artifact, "Starting replay command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if self.dry_run {
            config.application.dry_run = true;
        }
        let dry_run = config.application.dry_run;

        let records = match artifact::read_file(&self.artifact).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read sync artifact");
                eprintln!("Failed to read {}: {e}", self.artifact);
                return Ok(5);
            }
        };
        println!("📄 Loaded {} sync records from {}", records.len(), self.artifact);

        let client = match CommerceClient::new(config.commerce.clone()) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                eprintln!("Failed to initialize commerce client: {e}");
                return Ok(4);
            }
        };

        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("run", run_id = %run_id);
        let start_time = Instant::now();

        let outcomes = match reconcile_records(
            client,
            &config.sync,
            &records,
            dry_run,
            shutdown_signal.clone(),
        )
        .instrument(span)
        .await
        {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Replay failed");
                eprintln!("Replay failed: {e}");
                return Ok(5);
            }
        };

        let mut summary = RunSummary::new(run_id, dry_run)
            .with_fail_on_order_error(config.sync.fail_on_order_error);
        summary.records_built = records.len();
        summary.artifact_path = Some(self.artifact.clone());
        summary.record_outcomes(records.len(), outcomes);
        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        print_summary(&summary);

        Ok(if *shutdown_signal.borrow() {
            130
        } else if summary.is_successful() {
            println!("✅ Replay completed successfully!");
            0
        } else {
            println!("⚠️  Replay completed with failures");
            1
        })
    }
}
