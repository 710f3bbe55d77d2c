//! Deployment state machine states
//!
//! Each state owns exactly the data the next remote step needs, so a state
//! can only be reached once everything before it has succeeded.

use trellis_core::domain::credentials::Credentials;
use trellis_core::domain::deployment::Outcome;
use trellis_core::dto::github::{Workflow, WorkflowRun};

/// Validated credentials plus the branch everything happens on
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub creds: Credentials,
    pub branch: String,
}

#[derive(Debug)]
pub(crate) enum DeployState {
    ValidatingCredentials,
    FetchingRepoMetadata {
        creds: Credentials,
    },
    ResolvingCommitBase(Target),
    PublishingWorkflow {
        target: Target,
        base_commit: String,
        base_tree: String,
    },
    AwaitingRegistration(Target),
    TriggeringRun {
        target: Target,
        workflow: Workflow,
    },
    PollingRun {
        target: Target,
        workflow_id: u64,
    },
    CollectingResults {
        target: Target,
        run: WorkflowRun,
    },
    Done(Outcome),
}

impl DeployState {
    pub fn name(&self) -> &'static str {
        match self {
            DeployState::ValidatingCredentials => "validating_credentials",
            DeployState::FetchingRepoMetadata { .. } => "fetching_repo_metadata",
            DeployState::ResolvingCommitBase(_) => "resolving_commit_base",
            DeployState::PublishingWorkflow { .. } => "publishing_workflow",
            DeployState::AwaitingRegistration(_) => "awaiting_registration",
            DeployState::TriggeringRun { .. } => "triggering_run",
            DeployState::PollingRun { .. } => "polling_run",
            DeployState::CollectingResults { .. } => "collecting_results",
            DeployState::Done(_) => "done",
        }
    }
}
