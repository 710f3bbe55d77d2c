//! Repository and git data endpoints

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use trellis_core::domain::credentials::Credentials;
use trellis_core::dto::github::{
    Branch, CreateBlob, CreateCommit, CreateTree, GitObject, Repository, TreeEntry, UpdateRef,
};

use crate::GitHubClient;
use crate::error::{ClientError, Result};

impl GitHubClient {
    // =============================================================================
    // Repository Metadata
    // =============================================================================

    /// Get repository metadata (default branch)
    pub async fn get_repository(&self, creds: &Credentials) -> Result<Repository> {
        let url = self.repo_url(creds, "");
        let response = self.request(Method::GET, &url, creds).send().await?;

        self.handle_response(response).await
    }

    /// Get a branch and its head commit
    pub async fn get_branch(&self, creds: &Credentials, branch: &str) -> Result<Branch> {
        let url = self.repo_url(creds, &format!("/branches/{}", branch));
        let response = self.request(Method::GET, &url, creds).send().await?;

        self.handle_response(response).await
    }

    /// Get the tree of a commit
    pub async fn get_tree(&self, creds: &Credentials, sha: &str) -> Result<GitObject> {
        let url = self.repo_url(creds, &format!("/git/trees/{}", sha));
        let response = self.request(Method::GET, &url, creds).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Git Data
    // =============================================================================

    /// Upload file content as a blob
    ///
    /// The content is sent base64-encoded so arbitrary UTF-8 survives intact.
    pub async fn create_blob(&self, creds: &Credentials, content: &str) -> Result<GitObject> {
        let url = self.repo_url(creds, "/git/blobs");
        let body = CreateBlob {
            content: STANDARD.encode(content.as_bytes()),
            encoding: "base64".to_string(),
        };
        let response = self
            .request(Method::POST, &url, creds)
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create a tree with one file on top of `base_tree`
    pub async fn create_tree(
        &self,
        creds: &Credentials,
        base_tree: &str,
        path: &str,
        blob_sha: &str,
    ) -> Result<GitObject> {
        let url = self.repo_url(creds, "/git/trees");
        let body = CreateTree {
            base_tree: base_tree.to_string(),
            tree: vec![TreeEntry::file(path, blob_sha)],
        };
        let response = self
            .request(Method::POST, &url, creds)
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create a commit with a single parent
    pub async fn create_commit(
        &self,
        creds: &Credentials,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<GitObject> {
        let url = self.repo_url(creds, "/git/commits");
        let body = CreateCommit {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: vec![parent.to_string()],
        };
        let response = self
            .request(Method::POST, &url, creds)
            .json(&body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Move a branch to `sha` without forcing
    ///
    /// GitHub answers 422 ("not a fast forward") or 409 when the branch moved
    /// since the base commit was read; both become [`ClientError::Conflict`].
    pub async fn update_ref(&self, creds: &Credentials, branch: &str, sha: &str) -> Result<()> {
        let url = self.repo_url(creds, &format!("/git/refs/heads/{}", branch));
        let body = UpdateRef {
            sha: sha.to_string(),
            force: false,
        };
        let response = self
            .request(Method::PATCH, &url, creds)
            .json(&body)
            .send()
            .await?;

        match self.handle_empty_response(response).await {
            Err(ClientError::ApiError { status, message }) if status == 409 || status == 422 => {
                Err(ClientError::Conflict { status, message })
            }
            other => other,
        }
    }
}
