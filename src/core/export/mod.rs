//! Export orchestration
//!
//! This module provides the run-level logic of ordersync:
//! - File naming and bounded-concurrency writes
//! - The sync artifact (`orders_sync*.json`)
//! - Run coordination and summary reporting

pub mod artifact;
pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::{write_files, ExportFile, FileFailure, FileWriteReport, WrittenFile};
pub use coordinator::{reconcile_records, RunCoordinator};
pub use summary::RunSummary;
