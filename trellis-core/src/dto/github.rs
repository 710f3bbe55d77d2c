//! GitHub REST API DTOs

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub default_branch: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Any git object response where only the SHA matters (trees, blobs, commits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

/// `POST /repos/{owner}/{repo}/git/blobs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlob {
    pub content: String,
    pub encoding: String,
}

/// `POST /repos/{owner}/{repo}/git/trees`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTree {
    pub base_tree: String,
    pub tree: Vec<TreeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeEntry {
    /// A regular (non-executable) file entry
    pub fn file(path: impl Into<String>, blob_sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            sha: blob_sha.into(),
        }
    }
}

/// `POST /repos/{owner}/{repo}/git/commits`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

/// `PATCH /repos/{owner}/{repo}/git/refs/heads/{branch}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRef {
    pub sha: String,
    pub force: bool,
}

/// `GET /repos/{owner}/{repo}/actions/workflows`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowList {
    #[serde(default)]
    pub total_count: u64,
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// `POST /repos/{owner}/{repo}/actions/workflows/{id}/dispatches`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchWorkflow {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunList {
    #[serde(default)]
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub status: String,
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}/actions/runs/{id}/jobs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJobList {
    #[serde(default)]
    pub total_count: u64,
    pub jobs: Vec<RunJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunJob {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_entry_serializes_type_field() {
        let entry = TreeEntry::file(".github/workflows/ci.yml", "abc123");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "blob");
        assert_eq!(json["mode"], "100644");
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn test_dispatch_serializes_ref() {
        let body = DispatchWorkflow {
            git_ref: "main".to_string(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"ref":"main"}"#);
    }

    #[test]
    fn test_workflow_runs_ignore_extra_fields() {
        let json = r#"{
            "total_count": 1,
            "workflow_runs": [{
                "id": 42,
                "status": "in_progress",
                "conclusion": null,
                "html_url": "https://github.com/o/r/actions/runs/42",
                "head_branch": "main"
            }]
        }"#;

        let runs: WorkflowRunList = serde_json::from_str(json).unwrap();
        assert_eq!(runs.workflow_runs[0].id, 42);
        assert_eq!(runs.workflow_runs[0].conclusion, None);
    }
}
