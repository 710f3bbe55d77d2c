//! GitHub Actions endpoints

use reqwest::Method;
use trellis_core::domain::credentials::Credentials;
use trellis_core::dto::github::{
    DispatchWorkflow, RunJob, RunJobList, Workflow, WorkflowList, WorkflowRun, WorkflowRunList,
};

use crate::GitHubClient;
use crate::error::Result;

impl GitHubClient {
    // =============================================================================
    // Workflows
    // =============================================================================

    /// List workflows registered for the repository
    pub async fn list_workflows(&self, creds: &Credentials) -> Result<Vec<Workflow>> {
        let url = self.repo_url(creds, "/actions/workflows");
        let response = self.request(Method::GET, &url, creds).send().await?;

        let list: WorkflowList = self.handle_response(response).await?;
        Ok(list.workflows)
    }

    /// Trigger a `workflow_dispatch` run on a branch
    pub async fn dispatch_workflow(
        &self,
        creds: &Credentials,
        workflow_id: u64,
        branch: &str,
    ) -> Result<()> {
        let url = self.repo_url(creds, &format!("/actions/workflows/{}/dispatches", workflow_id));
        let body = DispatchWorkflow {
            git_ref: branch.to_string(),
        };
        let response = self
            .request(Method::POST, &url, creds)
            .json(&body)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Runs and Jobs
    // =============================================================================

    /// List runs of a workflow on a branch, most recent first
    pub async fn list_workflow_runs(
        &self,
        creds: &Credentials,
        workflow_id: u64,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>> {
        let url = self.repo_url(creds, &format!("/actions/workflows/{}/runs", workflow_id));
        let response = self
            .request(Method::GET, &url, creds)
            .query(&[("branch", branch)])
            .send()
            .await?;

        let list: WorkflowRunList = self.handle_response(response).await?;
        Ok(list.workflow_runs)
    }

    /// List the jobs of a run
    pub async fn list_run_jobs(&self, creds: &Credentials, run_id: u64) -> Result<Vec<RunJob>> {
        let url = self.repo_url(creds, &format!("/actions/runs/{}/jobs", run_id));
        let response = self.request(Method::GET, &url, creds).send().await?;

        let list: RunJobList = self.handle_response(response).await?;
        Ok(list.jobs)
    }

    /// Download the plain-text log of a job
    ///
    /// GitHub redirects to short-lived storage; reqwest follows the redirect.
    pub async fn get_job_logs(&self, creds: &Credentials, job_id: u64) -> Result<String> {
        let url = self.repo_url(creds, &format!("/actions/jobs/{}/logs", job_id));
        let response = self
            .request_accepting(Method::GET, &url, creds, "application/octet-stream")
            .send()
            .await?;

        self.handle_text_response(response).await
    }
}
