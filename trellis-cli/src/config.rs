//! Configuration module
//!
//! Combines command-line overrides with the deployer's environment
//! configuration.

use std::sync::Arc;

use anyhow::Result;
use trellis_client::GitHubClient;
use trellis_deployer::Deployer;

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API URL given on the command line, if any
    pub api_url: Option<String>,
}

impl Config {
    /// Deployer configuration from the environment plus CLI overrides
    pub fn deployer_config(&self) -> Result<trellis_deployer::Config> {
        let mut config = trellis_deployer::Config::from_env()?;

        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.as_str());
            config.validate()?;
        }

        Ok(config)
    }

    /// A deployer talking to the configured GitHub API
    pub fn deployer(&self) -> Result<Deployer> {
        let config = self.deployer_config()?;
        let client = GitHubClient::new(config.api_url.as_str());
        tracing::debug!(api_url = client.base_url(), "Using GitHub API");

        Ok(Deployer::new(Arc::new(client), config))
    }
}
