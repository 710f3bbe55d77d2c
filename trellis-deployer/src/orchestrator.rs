//! Deployment orchestrator
//!
//! Drives one session through the states in [`crate::state`]:
//! validate credentials, read the default branch and its head, commit the
//! workflow file on top of it, wait for GitHub to register the workflow,
//! dispatch a run, poll it, then collect per-job results and logs.
//!
//! Only one session runs per [`Deployer`] at a time. A second call while one
//! is in flight is rejected without touching the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};
use trellis_client::GitHubApi;
use trellis_core::domain::credentials::Credentials;
use trellis_core::domain::deployment::{
    DeploymentReport, Outcome, ProgressEntry, RunStatus, is_passing_conclusion,
};
use trellis_core::dto::github::{Repository, WorkflowRun};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::DeployError;
use crate::progress::ProgressLog;
use crate::state::{DeployState, Target};

/// Inputs of one deployment session
pub struct DeployRequest {
    pub token: String,
    /// `owner/name`
    pub repo: String,
    /// Rendered workflow YAML
    pub workflow: String,
    pub cancel: CancelToken,
    /// Receives each progress entry as it is appended
    pub listener: Option<mpsc::UnboundedSender<ProgressEntry>>,
}

impl DeployRequest {
    pub fn new(
        token: impl Into<String>,
        repo: impl Into<String>,
        workflow: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            repo: repo.into(),
            workflow: workflow.into(),
            cancel: CancelToken::new(),
            listener: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_listener(mut self, listener: mpsc::UnboundedSender<ProgressEntry>) -> Self {
        self.listener = Some(listener);
        self
    }
}

/// Mutable state shared by every step of a session
struct Session {
    id: Uuid,
    log: ProgressLog,
    cancel: CancelToken,
    workflow: String,
    run_id: Option<u64>,
    run_url: Option<String>,
}

impl Session {
    fn new(
        workflow: String,
        cancel: CancelToken,
        listener: Option<mpsc::UnboundedSender<ProgressEntry>>,
    ) -> Self {
        let log = match listener {
            Some(tx) => ProgressLog::with_listener(tx),
            None => ProgressLog::new(),
        };

        Self {
            id: Uuid::new_v4(),
            log,
            cancel,
            workflow,
            run_id: None,
            run_url: None,
        }
    }

    fn finish(self, outcome: Outcome) -> DeploymentReport {
        DeploymentReport {
            session_id: self.id,
            entries: self.log.into_entries(),
            outcome,
            run_id: self.run_id,
            run_url: self.run_url,
        }
    }
}

/// Clears the in-flight flag when the session ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Publishes workflows and follows their runs
pub struct Deployer {
    api: Arc<dyn GitHubApi>,
    config: Config,
    in_flight: AtomicBool,
}

impl Deployer {
    pub fn new(api: Arc<dyn GitHubApi>, config: Config) -> Self {
        Self {
            api,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a session is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate credentials and read the repository metadata
    ///
    /// Makes no changes to the repository.
    pub async fn check_connection(
        &self,
        token: &str,
        repo: &str,
    ) -> Result<Repository, DeployError> {
        let creds = Credentials::validate(token, repo)?;
        let repository = self.api.get_repository(&creds).await?;
        debug!(repo = %creds.repo(), branch = %repository.default_branch, "Connection verified");
        Ok(repository)
    }

    /// Run a full deployment session
    ///
    /// Never fails: errors end the session and are reported as the last
    /// progress line, with the outcome set accordingly.
    pub async fn deploy(&self, request: DeployRequest) -> DeploymentReport {
        let DeployRequest {
            token,
            repo,
            workflow,
            cancel,
            listener,
        } = request;
        let mut session = Session::new(workflow, cancel, listener);

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!(session = %session.id, "Rejected deployment: another session is in flight");
            session.log.error(DeployError::AlreadyRunning.progress_line());
            return session.finish(Outcome::Failure);
        };

        let span = info_span!("deploy", session = %session.id, repo = %repo);
        let outcome = self
            .run(&mut session, &token, &repo)
            .instrument(span)
            .await;

        session.finish(outcome)
    }

    async fn run(&self, session: &mut Session, token: &str, repo: &str) -> Outcome {
        info!("Starting deployment");
        session.log.info("Initializing GitHub Actions deployment...");

        let mut state = DeployState::ValidatingCredentials;

        loop {
            if let DeployState::Done(outcome) = state {
                info!(%outcome, "Deployment finished");
                return outcome;
            }

            debug!(state = state.name(), "Entering state");

            let result = if session.cancel.is_cancelled() {
                Err(DeployError::Cancelled)
            } else {
                self.step(state, session, token, repo).await
            };

            state = match result {
                Ok(next) => next,
                Err(err) => {
                    warn!(error = %err, "Deployment stopped");
                    session.log.push(err.level(), err.progress_line());
                    DeployState::Done(err.outcome())
                }
            };
        }
    }

    async fn step(
        &self,
        state: DeployState,
        session: &mut Session,
        token: &str,
        repo: &str,
    ) -> Result<DeployState, DeployError> {
        match state {
            DeployState::ValidatingCredentials => {
                let creds = Credentials::validate(token, repo)?;
                if session.workflow.trim().is_empty() {
                    return Err(DeployError::EmptyWorkflow);
                }
                Ok(DeployState::FetchingRepoMetadata { creds })
            }

            DeployState::FetchingRepoMetadata { creds } => {
                session.log.info("Fetching repository information...");
                let repository = self.api.get_repository(&creds).await?;
                session.log.info(format!(
                    "Using default branch: {}",
                    repository.default_branch
                ));

                Ok(DeployState::ResolvingCommitBase(Target {
                    creds,
                    branch: repository.default_branch,
                }))
            }

            DeployState::ResolvingCommitBase(target) => {
                session.log.info("Getting latest commit information...");
                let branch = self.api.get_branch(&target.creds, &target.branch).await?;
                let base_commit = branch.commit.sha;
                session
                    .log
                    .info(format!("Latest commit SHA: {}", short_sha(&base_commit)));

                let tree = self.api.get_tree(&target.creds, &base_commit).await?;

                Ok(DeployState::PublishingWorkflow {
                    target,
                    base_commit,
                    base_tree: tree.sha,
                })
            }

            DeployState::PublishingWorkflow {
                target,
                base_commit,
                base_tree,
            } => {
                self.publish(session, &target, &base_commit, &base_tree)
                    .await?;
                Ok(DeployState::AwaitingRegistration(target))
            }

            DeployState::AwaitingRegistration(target) => {
                session
                    .log
                    .info("Waiting for GitHub to register the workflow...");
                self.pause(session, self.config.registration_delay).await?;

                session.log.info("Fetching workflow information...");
                let workflow = self
                    .api
                    .list_workflows(&target.creds)
                    .await?
                    .into_iter()
                    .find(|w| w.path == self.config.workflow_path)
                    .ok_or(DeployError::WorkflowNotRegistered)?;
                debug!(workflow_id = workflow.id, "Workflow registered");

                Ok(DeployState::TriggeringRun { target, workflow })
            }

            DeployState::TriggeringRun { target, workflow } => {
                session.log.info(format!(
                    "Triggering workflow run for \"{}\"...",
                    workflow.name
                ));
                self.api
                    .dispatch_workflow(&target.creds, workflow.id, &target.branch)
                    .await?;
                session.log.success("✅ Workflow triggered successfully");

                Ok(DeployState::PollingRun {
                    target,
                    workflow_id: workflow.id,
                })
            }

            DeployState::PollingRun {
                target,
                workflow_id,
            } => self.poll_run(session, target, workflow_id).await,

            DeployState::CollectingResults { target, run } => {
                self.collect_results(session, &target, &run).await
            }

            DeployState::Done(outcome) => Ok(DeployState::Done(outcome)),
        }
    }

    /// Commit the workflow file on top of `base_commit` and move the branch
    async fn publish(
        &self,
        session: &mut Session,
        target: &Target,
        base_commit: &str,
        base_tree: &str,
    ) -> Result<(), DeployError> {
        let creds = &target.creds;
        let branch = target.branch.as_str();

        session.log.info("Creating workflow file...");
        let blob = self.api.create_blob(creds, &session.workflow).await?;

        session.log.info("Setting up directory structure...");
        let tree = self
            .api
            .create_tree(creds, base_tree, &self.config.workflow_path, &blob.sha)
            .await?;

        session.log.info("Committing workflow file to repository...");
        let commit = self
            .api
            .create_commit(creds, &self.config.commit_message, &tree.sha, base_commit)
            .await?;

        session
            .log
            .info(format!("Updating {} branch reference...", branch));
        self.api
            .update_ref(creds, branch, &commit.sha)
            .await
            .map_err(|e| DeployError::from_ref_update(e, branch))?;

        info!(commit = %commit.sha, branch, "Workflow published");
        session.log.success(format!(
            "✅ Workflow file committed successfully to {}",
            branch
        ));
        Ok(())
    }

    /// Poll the most recent run on the branch until it completes
    ///
    /// Only status changes are logged. A failed poll aborts the session like
    /// any other remote error; only missing or unfinished runs are re-checked.
    async fn poll_run(
        &self,
        session: &mut Session,
        target: Target,
        workflow_id: u64,
    ) -> Result<DeployState, DeployError> {
        session.log.info("Waiting for workflow run to start...");
        self.pause(session, self.config.poll_interval).await?;

        let max_attempts = self.config.max_poll_attempts;
        let mut last_status: Option<RunStatus> = None;
        let mut latest: Option<WorkflowRun> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                self.pause(session, self.config.poll_interval).await?;
            }

            let runs = self
                .api
                .list_workflow_runs(&target.creds, workflow_id, &target.branch)
                .await
                .inspect_err(|err| {
                    warn!(attempt, error = %err, "Failed to poll workflow runs");
                })?;

            let Some(run) = runs.into_iter().next() else {
                debug!(attempt, "No workflow run yet");
                continue;
            };

            let status = RunStatus::from_api(&run.status);
            if last_status.as_ref() != Some(&status) {
                session
                    .log
                    .info(status_line(&status, run.conclusion.as_deref()));
                last_status = Some(status.clone());
            }

            if session.run_id.is_none() {
                debug!(run_id = run.id, "Workflow run detected");
            }
            session.run_id = Some(run.id);
            session.run_url = Some(self.run_url(&target, &run));

            if status.is_completed() {
                return Ok(DeployState::CollectingResults { target, run });
            }
            latest = Some(run);
        }

        if let Some(run) = latest {
            session.log.warning(format!(
                "Workflow run is still in progress. Status: {}.",
                run.status
            ));
            let repo = target.creds.repo();
            session.log.info(format!(
                "View run at: {}",
                self.config.actions_url(repo.owner(), repo.name())
            ));
            return Ok(DeployState::Done(Outcome::Indeterminate));
        }

        session.log.warning(
            "Workflow was triggered but no run was detected after waiting. Check your GitHub Actions tab for status.",
        );
        Ok(DeployState::Done(Outcome::Indeterminate))
    }

    /// Report each job's conclusion and log
    ///
    /// A job whose log cannot be fetched gets a placeholder line; the other
    /// jobs and the outcome are unaffected. Cancellation only skips the
    /// remaining log downloads, since every conclusion is already known.
    async fn collect_results(
        &self,
        session: &mut Session,
        target: &Target,
        run: &WorkflowRun,
    ) -> Result<DeployState, DeployError> {
        session.log.info("Fetching job results...");
        let jobs = self.api.list_run_jobs(&target.creds, run.id).await?;

        let mut passing = is_passing_conclusion(run.conclusion.as_deref());
        let mut skipping_logs = false;

        for job in &jobs {
            let conclusion = job.conclusion.as_deref();
            passing &= is_passing_conclusion(conclusion);

            session.log.info(format!("Job: {}", job.name));
            session.log.info(format!(
                "Status: {}, Conclusion: {}",
                job.status,
                conclusion.unwrap_or("pending")
            ));

            if skipping_logs {
                continue;
            }

            session
                .log
                .info(format!("Fetching logs for job \"{}\"...", job.name));

            let logs = tokio::select! {
                biased;
                _ = session.cancel.cancelled() => None,
                logs = self.api.get_job_logs(&target.creds, job.id) => Some(logs),
            };

            match logs {
                Some(Ok(text)) => {
                    for line in text.lines().map(str::trim_end) {
                        if !line.trim().is_empty() {
                            session.log.info(line);
                        }
                    }
                }
                Some(Err(err)) => {
                    warn!(job_id = job.id, error = %err, "Failed to fetch job logs");
                    session.log.warning("Could not retrieve logs for this job.");
                }
                None => {
                    session
                        .log
                        .warning("⚠️ Deployment cancelled; skipping remaining job logs");
                    skipping_logs = true;
                }
            }
        }

        let run_url = session
            .run_url
            .clone()
            .unwrap_or_else(|| self.run_url(target, run));
        session.run_url = Some(run_url.clone());

        if !passing {
            session.log.error(format!(
                "❌ Workflow run failed with conclusion: {}",
                run.conclusion.as_deref().unwrap_or("unknown")
            ));
        }
        session
            .log
            .success(format!("✅ View complete run at: {}", run_url));

        Ok(DeployState::Done(if passing {
            Outcome::Success
        } else {
            Outcome::Failure
        }))
    }

    /// Sleep unless the session is cancelled first
    async fn pause(&self, session: &Session, duration: Duration) -> Result<(), DeployError> {
        tokio::select! {
            biased;
            _ = session.cancel.cancelled() => Err(DeployError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn run_url(&self, target: &Target, run: &WorkflowRun) -> String {
        match &run.html_url {
            Some(url) => url.clone(),
            None => {
                let repo = target.creds.repo();
                self.config.run_url(repo.owner(), repo.name(), run.id)
            }
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn status_line(status: &RunStatus, conclusion: Option<&str>) -> String {
    match status {
        RunStatus::Queued => "Workflow run is queued and waiting to start...".to_string(),
        RunStatus::InProgress => "Workflow run is in progress...".to_string(),
        RunStatus::Completed => format!(
            "Workflow run completed with conclusion: {}",
            conclusion.unwrap_or("unknown")
        ),
        RunStatus::Other(status) => format!("Workflow run status: {}", status),
    }
}
