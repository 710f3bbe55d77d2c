//! Deployment session domain types
//!
//! Results of one deploy-and-run session: the ordered progress log, the
//! remote run's status, and the terminal outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of a session's progress log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Terminal result of a deployment session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The run completed and every job passed
    Success,
    /// Something failed, locally or remotely
    Failure,
    /// The workflow was published but the run's result is unknown
    Indeterminate,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
            Outcome::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Lifecycle status of a remote workflow run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    /// Statuses like `waiting` or `requested`
    Other(String),
}

impl RunStatus {
    /// Map the status string reported by the API
    pub fn from_api(status: &str) -> Self {
        match status {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Other(status) => write!(f, "{}", status),
        }
    }
}

/// Whether a run or job conclusion counts as passing
///
/// Skipped jobs are the normal result of a false `if:` condition and do not
/// fail the run.
pub fn is_passing_conclusion(conclusion: Option<&str>) -> bool {
    matches!(conclusion, Some("success") | Some("skipped") | Some("neutral"))
}

/// Everything a caller gets back from a deployment session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub session_id: Uuid,
    pub entries: Vec<ProgressEntry>,
    pub outcome: Outcome,
    pub run_id: Option<u64>,
    pub run_url: Option<String>,
}

impl DeploymentReport {
    /// Progress messages without timestamps
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_from_api() {
        assert_eq!(RunStatus::from_api("queued"), RunStatus::Queued);
        assert_eq!(RunStatus::from_api("in_progress"), RunStatus::InProgress);
        assert!(RunStatus::from_api("completed").is_completed());
        assert_eq!(
            RunStatus::from_api("waiting"),
            RunStatus::Other("waiting".to_string())
        );
        assert_eq!(RunStatus::from_api("waiting").to_string(), "waiting");
    }

    #[test]
    fn test_passing_conclusions() {
        assert!(is_passing_conclusion(Some("success")));
        assert!(is_passing_conclusion(Some("skipped")));
        assert!(!is_passing_conclusion(Some("failure")));
        assert!(!is_passing_conclusion(Some("cancelled")));
        assert!(!is_passing_conclusion(None));
    }

    #[test]
    fn test_report_lines() {
        let report = DeploymentReport {
            session_id: Uuid::new_v4(),
            entries: vec![ProgressEntry {
                timestamp: Utc::now(),
                level: LogLevel::Info,
                message: "hello".to_string(),
            }],
            outcome: Outcome::Indeterminate,
            run_id: None,
            run_url: None,
        };
        assert_eq!(report.lines(), vec!["hello"]);
        assert!(!report.is_success());
        assert_eq!(report.outcome.to_string(), "indeterminate");
    }
}
