//! Trait seam between the deployer and GitHub
//!
//! One method per REST call the deployer makes, in the order a deployment
//! uses them. [`GitHubClient`] implements it over HTTP.

use async_trait::async_trait;
use trellis_core::domain::credentials::Credentials;
use trellis_core::dto::github::{Branch, GitObject, Repository, RunJob, Workflow, WorkflowRun};

use crate::GitHubClient;
use crate::error::Result;

/// Remote operations needed to publish and run a workflow
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Fetches repository metadata (default branch)
    async fn get_repository(&self, creds: &Credentials) -> Result<Repository>;

    /// Fetches a branch and its head commit
    async fn get_branch(&self, creds: &Credentials, branch: &str) -> Result<Branch>;

    /// Fetches the tree of a commit
    async fn get_tree(&self, creds: &Credentials, commit_sha: &str) -> Result<GitObject>;

    /// Uploads file content, returning the blob SHA
    async fn create_blob(&self, creds: &Credentials, content: &str) -> Result<GitObject>;

    /// Creates a tree adding one file at `path` on top of `base_tree`
    async fn create_tree(
        &self,
        creds: &Credentials,
        base_tree: &str,
        path: &str,
        blob_sha: &str,
    ) -> Result<GitObject>;

    /// Creates a commit with a single parent
    async fn create_commit(
        &self,
        creds: &Credentials,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<GitObject>;

    /// Fast-forwards a branch to `sha`; never forces
    async fn update_ref(&self, creds: &Credentials, branch: &str, sha: &str) -> Result<()>;

    /// Lists registered workflows
    async fn list_workflows(&self, creds: &Credentials) -> Result<Vec<Workflow>>;

    /// Triggers a workflow run on a branch
    async fn dispatch_workflow(&self, creds: &Credentials, workflow_id: u64, branch: &str)
    -> Result<()>;

    /// Lists runs of a workflow on a branch, most recent first
    async fn list_workflow_runs(
        &self,
        creds: &Credentials,
        workflow_id: u64,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>>;

    /// Lists the jobs of a run
    async fn list_run_jobs(&self, creds: &Credentials, run_id: u64) -> Result<Vec<RunJob>>;

    /// Downloads a job's raw log text
    async fn get_job_logs(&self, creds: &Credentials, job_id: u64) -> Result<String>;
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_repository(&self, creds: &Credentials) -> Result<Repository> {
        GitHubClient::get_repository(self, creds).await
    }

    async fn get_branch(&self, creds: &Credentials, branch: &str) -> Result<Branch> {
        GitHubClient::get_branch(self, creds, branch).await
    }

    async fn get_tree(&self, creds: &Credentials, commit_sha: &str) -> Result<GitObject> {
        GitHubClient::get_tree(self, creds, commit_sha).await
    }

    async fn create_blob(&self, creds: &Credentials, content: &str) -> Result<GitObject> {
        GitHubClient::create_blob(self, creds, content).await
    }

    async fn create_tree(
        &self,
        creds: &Credentials,
        base_tree: &str,
        path: &str,
        blob_sha: &str,
    ) -> Result<GitObject> {
        GitHubClient::create_tree(self, creds, base_tree, path, blob_sha).await
    }

    async fn create_commit(
        &self,
        creds: &Credentials,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<GitObject> {
        GitHubClient::create_commit(self, creds, message, tree, parent).await
    }

    async fn update_ref(&self, creds: &Credentials, branch: &str, sha: &str) -> Result<()> {
        GitHubClient::update_ref(self, creds, branch, sha).await
    }

    async fn list_workflows(&self, creds: &Credentials) -> Result<Vec<Workflow>> {
        GitHubClient::list_workflows(self, creds).await
    }

    async fn dispatch_workflow(
        &self,
        creds: &Credentials,
        workflow_id: u64,
        branch: &str,
    ) -> Result<()> {
        GitHubClient::dispatch_workflow(self, creds, workflow_id, branch).await
    }

    async fn list_workflow_runs(
        &self,
        creds: &Credentials,
        workflow_id: u64,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>> {
        GitHubClient::list_workflow_runs(self, creds, workflow_id, branch).await
    }

    async fn list_run_jobs(&self, creds: &Credentials, run_id: u64) -> Result<Vec<RunJob>> {
        GitHubClient::list_run_jobs(self, creds, run_id).await
    }

    async fn get_job_logs(&self, creds: &Credentials, job_id: u64) -> Result<String> {
        GitHubClient::get_job_logs(self, creds, job_id).await
    }
}
