//! Order-sync reconciliation engine
//!
//! - [`dedup`] - first-occurrence index of order numbers
//! - [`builder`] - export rows to sync-intent records
//! - [`locator`] - channel, state and order lookups
//! - [`planner`] - pure computation of the sync-info and transition updates
//! - [`applier`] - submission of versioned updates
//! - [`reconciler`] - per-order state machine and bounded scheduling

pub mod applier;
pub mod builder;
pub mod dedup;
pub mod locator;
pub mod planner;
pub mod reconciler;

pub use applier::{AppliedUpdate, UpdateApplier};
pub use builder::SyncRecordBuilder;
pub use dedup::DedupIndex;
pub use locator::RemoteOrderLocator;
pub use planner::{plan_line_item_transition, plan_sync_info_update};
pub use reconciler::{OrderOutcome, ReconcileOptions, Reconciler, SyncContext, SyncStage};
