//! Trellis GitHub Client
//!
//! A small, type-safe client for the parts of the GitHub REST API the
//! deployer needs: git data (blobs, trees, commits, refs) and Actions
//! (workflows, runs, jobs, logs).
//!
//! The deployer talks to GitHub through the [`GitHubApi`] trait so tests can
//! substitute an in-memory fake; [`GitHubClient`] is the HTTP implementation.
//!
//! # Example
//!
//! ```no_run
//! use trellis_client::GitHubClient;
//! use trellis_core::domain::credentials::Credentials;
//!
//! # async fn example() -> trellis_client::Result<()> {
//! let creds = Credentials::validate(&std::env::var("GITHUB_TOKEN").unwrap(), "octo/hello").unwrap();
//! let client = GitHubClient::new("https://api.github.com");
//!
//! let repo = client.get_repository(&creds).await?;
//! println!("Default branch: {}", repo.default_branch);
//! # Ok(())
//! # }
//! ```

mod actions;
mod api;
pub mod error;
mod git;

pub use api::GitHubApi;
pub use error::{ClientError, Result};

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use trellis_core::domain::credentials::Credentials;

/// Default REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// HTTP client for the GitHub REST API
///
/// The token is not stored; every call takes the session's [`Credentials`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "https://api.github.com")
    ///
    /// # Example
    /// ```
    /// use trellis_client::GitHubClient;
    ///
    /// let client = GitHubClient::new("https://api.github.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use trellis_client::GitHubClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = GitHubClient::with_client("https://api.github.com", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a path under `/repos/{owner}/{repo}`
    fn repo_url(&self, creds: &Credentials, path: &str) -> String {
        let repo = creds.repo();
        format!(
            "{}/repos/{}/{}{}",
            self.base_url,
            repo.owner(),
            repo.name(),
            path
        )
    }

    /// Start an authenticated JSON request
    fn request(&self, method: Method, url: &str, creds: &Credentials) -> RequestBuilder {
        self.request_accepting(method, url, creds, JSON_MEDIA_TYPE)
    }

    /// Start an authenticated request for a specific media type
    fn request_accepting(
        &self,
        method: Method,
        url: &str,
        creds: &Credentials,
        accept: &str,
    ) -> RequestBuilder {
        tracing::debug!(%method, url, "GitHub API request");

        self.client
            .request(method, url)
            .bearer_auth(creds.token())
            .header(ACCEPT, accept)
            .header(USER_AGENT, concat!("trellis/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., dispatches)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await?;
        Ok(())
    }

    /// Handle an API response with a plain-text body (job logs)
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = self.check_status(response).await?;

        response
            .text()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to read response body: {}", e)))
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), "GitHub API error response");
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::validate(&"a".repeat(40), "octo/hello").unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(DEFAULT_API_URL);
        assert_eq!(client.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitHubClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = GitHubClient::with_client("http://localhost:8080", http_client);
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_repo_url() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/");
        assert_eq!(
            client.repo_url(&creds(), "/git/blobs"),
            "https://ghe.example.com/api/v3/repos/octo/hello/git/blobs"
        );
    }
}
