//! Deployer configuration
//!
//! Endpoints, where the workflow file lands, and how long to wait for GitHub
//! at each step.

use std::time::Duration;

use trellis_client::DEFAULT_API_URL;

/// Default browser URL used to build run links
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Default repository path of the published workflow
pub const DEFAULT_WORKFLOW_PATH: &str = ".github/workflows/visual-cicd-workflow.yml";

/// Default commit message for the workflow commit
pub const DEFAULT_COMMIT_MESSAGE: &str = "Add GitHub Actions workflow via Visual CI/CD";

/// Deployer configuration
///
/// Delays are configurable so tests and self-hosted GitHub instances can
/// shorten or lengthen them.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST API base URL (e.g., "https://api.github.com")
    pub api_url: String,

    /// Web base URL used when the API omits a run link
    pub web_url: String,

    /// Path of the workflow file inside the repository
    pub workflow_path: String,

    /// Message of the commit that publishes the workflow
    pub commit_message: String,

    /// Wait between publishing the file and looking up the workflow, and
    /// between dispatching and the first poll
    pub registration_delay: Duration,

    /// Wait between two polls of the run status
    pub poll_interval: Duration,

    /// Number of status polls before giving up
    pub max_poll_attempts: u32,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            workflow_path: DEFAULT_WORKFLOW_PATH.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            registration_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 30,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional:
    /// - TRELLIS_API_URL (default: https://api.github.com)
    /// - TRELLIS_WEB_URL (default: https://github.com)
    /// - TRELLIS_WORKFLOW_PATH (default: .github/workflows/visual-cicd-workflow.yml)
    /// - TRELLIS_REGISTRATION_DELAY (seconds, default: 5)
    /// - TRELLIS_POLL_INTERVAL (seconds, default: 5)
    /// - TRELLIS_MAX_POLL_ATTEMPTS (default: 30)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::new();

        let api_url = std::env::var("TRELLIS_API_URL").unwrap_or(defaults.api_url);
        let web_url = std::env::var("TRELLIS_WEB_URL").unwrap_or(defaults.web_url);
        let workflow_path =
            std::env::var("TRELLIS_WORKFLOW_PATH").unwrap_or(defaults.workflow_path);

        let registration_delay = std::env::var("TRELLIS_REGISTRATION_DELAY")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.registration_delay);

        let poll_interval = std::env::var("TRELLIS_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let max_poll_attempts = std::env::var("TRELLIS_MAX_POLL_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_poll_attempts);

        let config = Self {
            api_url,
            web_url,
            workflow_path,
            commit_message: defaults.commit_message,
            registration_delay,
            poll_interval,
            max_poll_attempts,
        };
        config.validate()?;
        Ok(config)
    }

    /// Overrides the API base URL
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [("api_url", &self.api_url), ("web_url", &self.web_url)] {
            if url.is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }

            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.workflow_path.trim().is_empty() {
            anyhow::bail!("workflow_path cannot be empty");
        }

        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than 0");
        }

        Ok(())
    }

    /// Link to the Actions tab of a repository
    pub fn actions_url(&self, owner: &str, name: &str) -> String {
        format!(
            "{}/{}/{}/actions",
            self.web_url.trim_end_matches('/'),
            owner,
            name
        )
    }

    /// Link to a single run, used when the API response has no `html_url`
    pub fn run_url(&self, owner: &str, name: &str, run_id: u64) -> String {
        format!("{}/runs/{}", self.actions_url(owner, name), run_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
