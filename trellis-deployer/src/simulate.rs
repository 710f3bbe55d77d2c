//! Dry-run sessions
//!
//! Walks the jobs of a workflow and produces the progress log a real run
//! would, without any remote call. Used when no repository is connected.

use std::time::Duration;

use tokio::sync::mpsc;
use trellis_core::domain::deployment::{DeploymentReport, Outcome, ProgressEntry};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::DeployError;
use crate::progress::ProgressLog;

/// Delay between simulated progress lines
const SIMULATED_STEP: Duration = Duration::from_millis(300);

/// Simulate a run of `jobs` in order
///
/// Every job succeeds. Cancelling stops at the next line and leaves the
/// outcome indeterminate.
pub async fn simulate(
    jobs: &[String],
    cancel: &CancelToken,
    listener: Option<mpsc::UnboundedSender<ProgressEntry>>,
) -> DeploymentReport {
    let session_id = Uuid::new_v4();
    let mut log = match listener {
        Some(tx) => ProgressLog::with_listener(tx),
        None => ProgressLog::new(),
    };

    tracing::info!(session = %session_id, jobs = jobs.len(), "Starting simulated run");
    let outcome = match walk(jobs, cancel, &mut log).await {
        Ok(()) => Outcome::Success,
        Err(err) => {
            log.push(err.level(), err.progress_line());
            err.outcome()
        }
    };

    DeploymentReport {
        session_id,
        entries: log.into_entries(),
        outcome,
        run_id: None,
        run_url: None,
    }
}

async fn walk(
    jobs: &[String],
    cancel: &CancelToken,
    log: &mut ProgressLog,
) -> Result<(), DeployError> {
    log.info("Initializing pipeline...");
    step(cancel).await?;
    log.info("Running in simulation mode (no repository connected)");

    if jobs.is_empty() {
        log.warning("No jobs defined; nothing to run.");
    }

    for job in jobs {
        for stage in ["Started", "Processing...", "Running commands..."] {
            step(cancel).await?;
            log.info(format!("[{}] {}", job, stage));
        }
        step(cancel).await?;
        log.success(format!("[{}] Completed successfully", job));
    }

    step(cancel).await?;
    log.success("✅ Pipeline execution completed successfully.");
    Ok(())
}

async fn step(cancel: &CancelToken) -> Result<(), DeployError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DeployError::Cancelled),
        _ = tokio::time::sleep(SIMULATED_STEP) => Ok(()),
    }
}
