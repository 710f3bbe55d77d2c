//! Deployment errors
//!
//! Every error ends a session. [`DeployError::outcome`] decides whether the
//! session failed or merely lost track of the run, and
//! [`DeployError::progress_line`] is the single terminal line it leaves in
//! the progress log.

use thiserror::Error;
use trellis_client::ClientError;
use trellis_core::domain::credentials::CredentialError;
use trellis_core::domain::deployment::{LogLevel, Outcome};

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    InvalidCredentials(#[from] CredentialError),

    #[error("Workflow content is empty")]
    EmptyWorkflow,

    /// GitHub answered with a non-2xx status
    #[error("Error {status}: {payload}")]
    Remote { status: u16, payload: String },

    /// No response at all
    #[error("Error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be decoded
    #[error("Error: invalid response from GitHub: {0}")]
    InvalidResponse(String),

    /// The branch moved between reading its head and updating it
    #[error(
        "Conflict: branch '{branch}' changed while the workflow was being committed (status {status}). Re-run the deployment to build on the latest commit"
    )]
    Conflict {
        branch: String,
        status: u16,
        payload: String,
    },

    #[error(
        "Workflow file was created but workflow was not found. It may take a moment for GitHub to register the workflow."
    )]
    WorkflowNotRegistered,

    #[error("Deployment cancelled")]
    Cancelled,

    #[error("Another deployment is already in progress")]
    AlreadyRunning,
}

impl DeployError {
    /// Map a ref update failure, keeping the branch for the conflict message
    pub fn from_ref_update(err: ClientError, branch: &str) -> Self {
        match err {
            ClientError::Conflict { status, message } => DeployError::Conflict {
                branch: branch.to_string(),
                status,
                payload: message,
            },
            other => other.into(),
        }
    }

    /// Session outcome when this error ends it
    ///
    /// Once the workflow is committed, losing track of it says nothing about
    /// whether the run itself succeeds.
    pub fn outcome(&self) -> Outcome {
        match self {
            DeployError::WorkflowNotRegistered | DeployError::Cancelled => Outcome::Indeterminate,
            _ => Outcome::Failure,
        }
    }

    pub fn level(&self) -> LogLevel {
        match self.outcome() {
            Outcome::Indeterminate => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }

    /// Terminal progress line for this error
    pub fn progress_line(&self) -> String {
        match self.level() {
            LogLevel::Error => format!("❌ {}", self),
            _ => format!("⚠️ {}", self),
        }
    }
}

impl From<ClientError> for DeployError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, message } => DeployError::Remote {
                status,
                payload: message,
            },
            ClientError::Conflict { status, message } => DeployError::Remote {
                status,
                payload: message,
            },
            ClientError::RequestFailed(e) => DeployError::Transport(e.to_string()),
            ClientError::ParseError(msg) => DeployError::InvalidResponse(msg),
        }
    }
}
