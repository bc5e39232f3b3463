//! Run summary and reporting

use crate::core::export::batch::FileFailure;
use crate::core::sync::OrderOutcome;
use std::time::Duration;

/// Summary of one export and sync run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Correlation id of the run
    pub run_id: String,

    /// True if nothing was written or submitted
    pub dry_run: bool,

    /// Orders included in the export
    pub orders_exported: usize,

    /// Files written
    pub files_written: usize,

    /// Files that failed to write and were skipped
    pub file_failures: Vec<FileFailure>,

    /// Sync-intent records built
    pub records_built: usize,

    /// Path of the sync artifact, if one was written
    pub artifact_path: Option<String>,

    /// Per-order outcomes, in record order
    pub outcomes: Vec<OrderOutcome>,

    /// Records never started (halted or shut down)
    pub orders_not_attempted: usize,

    /// Count failed or unattempted orders against the run
    pub fail_on_order_error: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty summary for a run
    pub fn new(run_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: run_id.into(),
            dry_run,
            ..Default::default()
        }
    }

    /// Make order failures fail the run
    pub fn with_fail_on_order_error(mut self, fail_on_order_error: bool) -> Self {
        self.fail_on_order_error = fail_on_order_error;
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Records the outcomes of a reconciliation pass over `record_count` records
    pub fn record_outcomes(&mut self, record_count: usize, outcomes: Vec<OrderOutcome>) {
        self.orders_not_attempted = record_count.saturating_sub(outcomes.len());
        self.outcomes = outcomes;
    }

    /// Orders whose updates were both accepted
    pub fn orders_synced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, OrderOutcome::Success { .. }))
            .count()
    }

    /// Orders planned in a dry run
    pub fn orders_planned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, OrderOutcome::Planned { .. }))
            .count()
    }

    /// Orders that failed
    pub fn orders_failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Failed outcomes
    pub fn failures(&self) -> impl Iterator<Item = &OrderOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// True if no file failed
    ///
    /// Failed and unattempted orders only count when `fail_on_order_error`
    /// is set.
    pub fn is_successful(&self) -> bool {
        if !self.file_failures.is_empty() {
            return false;
        }
        !self.fail_on_order_error || (self.orders_failed() == 0 && self.orders_not_attempted == 0)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            orders_exported = self.orders_exported,
            files_written = self.files_written,
            files_skipped = self.file_failures.len(),
            records_built = self.records_built,
            orders_synced = self.orders_synced(),
            orders_planned = self.orders_planned(),
            orders_failed = self.orders_failed(),
            orders_not_attempted = self.orders_not_attempted,
            duration_secs = self.duration.as_secs_f64(),
            "Run completed"
        );

        for failure in &self.file_failures {
            tracing::warn!(path = %failure.path, reason = %failure.reason, "File skipped");
        }

        for outcome in self.failures() {
            if let OrderOutcome::Failed {
                order_number,
                stage,
                reason,
            } = outcome
            {
                tracing::warn!(
                    order_number = %order_number,
                    stage = %stage,
                    reason = %reason,
                    "Order failed"
                );
            }
        }
    }
}
