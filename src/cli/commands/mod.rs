//! CLI command implementations

pub mod export;
pub mod replay;
pub mod validate;

use crate::core::export::RunSummary;
use crate::core::sync::OrderOutcome;

/// Maximum failures listed on the console; the log has all of them
const MAX_PRINTED_FAILURES: usize = 10;

/// Prints a run summary to stdout
pub(crate) fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary ({}):", summary.run_id);
    println!("  Orders Exported: {}", summary.orders_exported);
    println!("  Files Written: {}", summary.files_written);
    println!("  Files Skipped: {}", summary.file_failures.len());
    println!("  Sync Records: {}", summary.records_built);
    if let Some(path) = &summary.artifact_path {
        println!("  Sync Artifact: {path}");
    }
    if summary.dry_run {
        println!("  Orders Planned: {}", summary.orders_planned());
    } else {
        println!("  Orders Synced: {}", summary.orders_synced());
    }
    println!("  Orders Failed: {}", summary.orders_failed());
    println!("  Orders Not Attempted: {}", summary.orders_not_attempted);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for failure in summary.file_failures.iter().take(MAX_PRINTED_FAILURES) {
        println!("  ⚠️  {}: {}", failure.path, failure.reason);
    }

    let failed: Vec<&OrderOutcome> = summary.failures().collect();
    for outcome in failed.iter().take(MAX_PRINTED_FAILURES) {
        if let OrderOutcome::Failed {
            order_number,
            stage,
            reason,
        } = outcome
        {
            println!("  ⚠️  Order {order_number} failed at {stage}: {reason}");
        }
    }
    if failed.len() > MAX_PRINTED_FAILURES {
        println!("    ... and {} more failures", failed.len() - MAX_PRINTED_FAILURES);
    }
}
