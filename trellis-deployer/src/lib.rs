//! Trellis Deployer
//!
//! Publishes a generated workflow to a GitHub repository, triggers it, and
//! follows the run to completion.
//!
//! Architecture:
//! - Configuration: endpoints, workflow path and timing bounds
//! - Progress: the append-only log a session hands back to its caller
//! - Orchestrator: an explicit state machine, one state per remote step
//! - Cancellation: a token checked at every delay, poll and log download
//! - Simulation: a dry run over the job names, for when no repository is set
//!
//! A deployment never returns an error: whatever happens, the caller gets a
//! [`DeploymentReport`](trellis_core::domain::deployment::DeploymentReport)
//! with every progress line captured up to that point.

mod cancel;
mod config;
mod error;
mod orchestrator;
mod progress;
mod simulate;
mod state;

pub use cancel::CancelToken;
pub use config::Config;
pub use error::DeployError;
pub use orchestrator::{DeployRequest, Deployer};
pub use progress::ProgressLog;
pub use simulate::simulate;
