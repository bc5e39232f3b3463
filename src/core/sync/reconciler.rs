//! Per-order reconciliation
//!
//! Each order goes through
//! `Located -> SyncInfoPlanned -> SyncInfoApplied -> TransitionPlanned -> TransitionApplied`.
//! A failure at any step ends that order with [`OrderOutcome::Failed`] and
//! never affects other orders.
//!
//! The version sent with the transition is always the located version plus
//! one, tracked locally. The version returned by the sync-info update is only
//! compared against it for diagnostics.

use super::applier::UpdateApplier;
use super::locator::RemoteOrderLocator;
use super::planner::{plan_line_item_transition, plan_sync_info_update};
use crate::adapters::commerce::OrderDirectory;
use crate::config::SyncConfig;
use crate::domain::{OrderNumber, OrderSyncError, Result, SyncIntentRecord};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;

/// Steps of the per-order state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Order resolved from its order number
    Located,
    /// Sync-info update computed
    SyncInfoPlanned,
    /// Sync-info update accepted
    SyncInfoApplied,
    /// Line item transition computed
    TransitionPlanned,
    /// Line item transition accepted
    TransitionApplied,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Located => "located",
            SyncStage::SyncInfoPlanned => "sync_info_planned",
            SyncStage::SyncInfoApplied => "sync_info_applied",
            SyncStage::TransitionPlanned => "transition_planned",
            SyncStage::TransitionApplied => "transition_applied",
        };
        f.write_str(name)
    }
}

/// Terminal result of reconciling one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Both updates were accepted
    Success {
        /// Order number from the sync record
        order_number: OrderNumber,
        /// Remote id of the order
        order_id: String,
        /// Locally tracked version after both updates
        final_version: u64,
    },

    /// Dry run: updates were planned but not submitted
    Planned {
        /// Order number from the sync record
        order_number: OrderNumber,
        /// Remote id of the order
        order_id: String,
        /// Number of actions across both planned updates
        actions: usize,
    },

    /// The order could not be reconciled
    Failed {
        /// Order number from the sync record
        order_number: OrderNumber,
        /// Stage that could not be reached
        stage: SyncStage,
        /// Error message
        reason: String,
    },
}

impl OrderOutcome {
    fn failed(order_number: &OrderNumber, stage: SyncStage, error: &OrderSyncError) -> Self {
        OrderOutcome::Failed {
            order_number: order_number.clone(),
            stage,
            reason: error.to_string(),
        }
    }

    /// Order number the outcome belongs to
    pub fn order_number(&self) -> &OrderNumber {
        match self {
            OrderOutcome::Success { order_number, .. }
            | OrderOutcome::Planned { order_number, .. }
            | OrderOutcome::Failed { order_number, .. } => order_number,
        }
    }

    /// True for [`OrderOutcome::Failed`]
    pub fn is_failed(&self) -> bool {
        matches!(self, OrderOutcome::Failed { .. })
    }
}

/// Run context resolved once before any order is processed
#[derive(Clone)]
pub struct SyncContext {
    /// Id of the export channel recorded in sync info
    pub channel_id: String,

    /// Id of the state line items are moved to
    pub target_state_id: String,

    locator: RemoteOrderLocator,
    applier: UpdateApplier,
}

impl SyncContext {
    /// Resolves the channel and target state ids
    ///
    /// # Errors
    ///
    /// `NotFound` if either key does not exist; the run must not touch any
    /// order in that case.
    pub async fn resolve(directory: Arc<dyn OrderDirectory>, sync: &SyncConfig) -> Result<Self> {
        let channel_key = sync.channel().map_err(OrderSyncError::Configuration)?;
        let state_key = sync.target_state().map_err(OrderSyncError::Configuration)?;

        let locator = RemoteOrderLocator::new(directory.clone(), sync.match_policy);
        let channel_id = locator.find_channel_id(&channel_key).await?;
        let target_state_id = locator.find_state_id(&state_key).await?;

        tracing::info!(
            channel_key = %channel_key,
            channel_id = %channel_id,
            state_key = %state_key,
            state_id = %target_state_id,
            "Resolved sync context"
        );

        Ok(Self {
            channel_id,
            target_state_id,
            locator,
            applier: UpdateApplier::new(directory),
        })
    }
}

/// Scheduling options for [`Reconciler::sync_all`]
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Plan and log updates without submitting them
    pub dry_run: bool,

    /// Orders processed concurrently
    pub concurrency: usize,

    /// Keep scheduling orders after a failure
    pub continue_on_error: bool,
}

impl ReconcileOptions {
    /// Options derived from the sync configuration
    pub fn from_config(sync: &SyncConfig, dry_run: bool) -> Self {
        Self {
            dry_run,
            concurrency: sync.order_concurrency,
            continue_on_error: sync.continue_on_order_error,
        }
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 1,
            continue_on_error: true,
        }
    }
}

/// Drives the per-order state machine
pub struct Reconciler {
    context: SyncContext,
    options: ReconcileOptions,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Reconciler {
    /// Creates a reconciler for a resolved context
    pub fn new(context: SyncContext, options: ReconcileOptions) -> Self {
        Self {
            context,
            options,
            shutdown: None,
        }
    }

    /// Stops scheduling new orders once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Reconciles one order
    pub async fn sync_order(&self, record: &SyncIntentRecord) -> OrderOutcome {
        let span = tracing::info_span!("order", order_number = %record.order_number);
        self.run_state_machine(record).instrument(span).await
    }

    async fn run_state_machine(&self, record: &SyncIntentRecord) -> OrderOutcome {
        let number = &record.order_number;
        let ctx = &self.context;

        let order = match ctx.locator.find_order_by_number(number).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to locate order");
                return OrderOutcome::failed(number, SyncStage::Located, &e);
            }
        };
        tracing::debug!(order_id = %order.id, version = order.version, "Located order");

        let sync_info = plan_sync_info_update(order.version, &ctx.channel_id, record.external_id());
        let next_version = order.version + 1;

        if self.options.dry_run {
            let transition =
                plan_line_item_transition(&order.line_items, &ctx.target_state_id, next_version);
            tracing::info!(
                order_id = %order.id,
                sync_info_version = sync_info.version,
                transition_version = transition.version,
                transitions = transition.len(),
                "Dry run: updates planned, not submitted"
            );
            return OrderOutcome::Planned {
                order_number: number.clone(),
                order_id: order.id,
                actions: sync_info.len() + transition.len(),
            };
        }

        match ctx.applier.apply(&order.id, &sync_info).await {
            Ok(applied) => {
                if let Some(returned) = applied.returned_version() {
                    if returned != next_version {
                        tracing::warn!(
                            expected = next_version,
                            returned,
                            "Remote version differs from the locally tracked version"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sync info update rejected");
                return OrderOutcome::failed(number, SyncStage::SyncInfoApplied, &e);
            }
        }

        let transition =
            plan_line_item_transition(&order.line_items, &ctx.target_state_id, next_version);

        if let Err(e) = ctx.applier.apply(&order.id, &transition).await {
            tracing::warn!(error = %e, "Line item transition rejected");
            return OrderOutcome::failed(number, SyncStage::TransitionApplied, &e);
        }

        tracing::info!(order_id = %order.id, transitions = transition.len(), "Order synced");

        OrderOutcome::Success {
            order_number: number.clone(),
            order_id: order.id,
            final_version: next_version + 1,
        }
    }

    /// Reconciles `records` with bounded concurrency
    ///
    /// Outcomes are returned in record order. Records never started (after a
    /// failure with `continue_on_error = false`, or after shutdown) have no
    /// outcome.
    pub async fn sync_all(&self, records: &[SyncIntentRecord]) -> Vec<OrderOutcome> {
        let halted = AtomicBool::new(false);
        let halted = &halted;

        stream::iter(records)
            .map(|record| async move {
                if halted.load(Ordering::SeqCst) || self.shutdown_requested() {
                    tracing::debug!(order_number = %record.order_number, "Order not attempted");
                    return None;
                }

                let outcome = self.sync_order(record).await;
                if outcome.is_failed()
                    && !self.options.continue_on_error
                    && !halted.swap(true, Ordering::SeqCst)
                {
                    tracing::error!(
                        order_number = %record.order_number,
                        "Stopping after order failure"
                    );
                }
                Some(outcome)
            })
            .buffered(self.options.concurrency.max(1))
            .filter_map(futures::future::ready)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(SyncStage::Located.to_string(), "located");
        assert_eq!(SyncStage::TransitionApplied.to_string(), "transition_applied");
    }

    #[test]
    fn test_outcome_helpers() {
        let number: OrderNumber = "1001".parse().unwrap();
        let failed = OrderOutcome::failed(
            &number,
            SyncStage::Located,
            &OrderSyncError::not_found("order", "1001"),
        );
        assert!(failed.is_failed());
        assert_eq!(failed.order_number().as_str(), "1001");

        match failed {
            OrderOutcome::Failed { reason, .. } => assert_eq!(reason, "order not found: 1001"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_options_from_config() {
        let sync = SyncConfig {
            order_concurrency: 4,
            continue_on_order_error: false,
            ..Default::default()
        };
        let options = ReconcileOptions::from_config(&sync, true);
        assert!(options.dry_run);
        assert_eq!(options.concurrency, 4);
        assert!(!options.continue_on_error);
    }
}
