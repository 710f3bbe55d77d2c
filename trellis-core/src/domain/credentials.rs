//! Repository credentials
//!
//! Local, network-free validation of a GitHub token and an `owner/name`
//! repository identifier. A [`Credentials`] value can only be obtained
//! through [`Credentials::validate`], so anything holding one has passed
//! these checks.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum length of a legacy (unprefixed) token
const LEGACY_TOKEN_MIN_LEN: usize = 40;
/// Minimum length of the body of a `ghp_`/`ghs_` token
const PREFIXED_TOKEN_MIN_BODY: usize = 36;
const TOKEN_MAX_LEN: usize = 255;

static PREFIXED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gh[ps]_[A-Za-z0-9_]{36,255}$").unwrap());
static LEGACY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{40,255}$").unwrap());
static OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][-A-Za-z0-9]*$").unwrap());
static REPO_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

/// Reasons a token or repository identifier is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("API token is required")]
    MissingToken,

    #[error(
        "API token is too short ({length} characters); expected a ghp_/ghs_ token or a classic token of at least 40 characters"
    )]
    TokenTooShort { length: usize },

    #[error("API token is too long ({length} characters)")]
    TokenTooLong { length: usize },

    #[error("API token appears to be in an invalid format. Expected a GitHub Personal Access Token")]
    TokenFormat,

    #[error("Repository is required")]
    MissingRepository,

    #[error("Repository must be in format 'owner/repo'")]
    RepositoryFormat,

    #[error("Repository owner name cannot be empty")]
    EmptyOwner,

    #[error("Repository owner name contains invalid characters")]
    InvalidOwner,

    #[error("Repository name cannot be empty")]
    EmptyName,

    #[error("Repository name contains invalid characters")]
    InvalidName,
}

/// A validated `owner/name` repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    owner: String,
    name: String,
}

impl RepoSlug {
    /// Parse and validate an `owner/name` string
    pub fn parse(input: &str) -> Result<Self, CredentialError> {
        if input.is_empty() {
            return Err(CredentialError::MissingRepository);
        }

        let (owner, name) = input
            .split_once('/')
            .ok_or(CredentialError::RepositoryFormat)?;

        if name.contains('/') {
            return Err(CredentialError::RepositoryFormat);
        }

        if owner.trim().is_empty() {
            return Err(CredentialError::EmptyOwner);
        }
        if !OWNER.is_match(owner) {
            return Err(CredentialError::InvalidOwner);
        }

        if name.trim().is_empty() {
            return Err(CredentialError::EmptyName);
        }
        if !REPO_NAME.is_match(name) {
            return Err(CredentialError::InvalidName);
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Check a token's shape without contacting GitHub
pub fn validate_token(token: &str) -> Result<(), CredentialError> {
    if token.is_empty() {
        return Err(CredentialError::MissingToken);
    }

    let length = token.chars().count();
    if length > TOKEN_MAX_LEN {
        return Err(CredentialError::TokenTooLong { length });
    }

    if let Some(body) = token
        .strip_prefix("ghp_")
        .or_else(|| token.strip_prefix("ghs_"))
    {
        if body.chars().count() < PREFIXED_TOKEN_MIN_BODY {
            return Err(CredentialError::TokenTooShort { length });
        }
        if PREFIXED_TOKEN.is_match(token) {
            return Ok(());
        }
        return Err(CredentialError::TokenFormat);
    }

    if length < LEGACY_TOKEN_MIN_LEN {
        return Err(CredentialError::TokenTooShort { length });
    }
    if LEGACY_TOKEN.is_match(token) {
        return Ok(());
    }

    Err(CredentialError::TokenFormat)
}

/// A token and repository that passed local validation
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    repo: RepoSlug,
}

impl Credentials {
    /// Validate a raw token and repository identifier
    ///
    /// The token is checked first, matching the order fields appear in the
    /// connect dialog.
    pub fn validate(token: &str, repo: &str) -> Result<Self, CredentialError> {
        validate_token(token)?;
        let repo = RepoSlug::parse(repo)?;

        Ok(Self {
            token: token.to_string(),
            repo,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_token() -> String {
        "a1b2c3d4e5".repeat(4)
    }

    #[test]
    fn test_prefixed_token_accepted() {
        let token = format!("ghp_{}", "A1_b".repeat(9));
        assert_eq!(token.len(), 40);
        assert!(validate_token(&token).is_ok());

        let server = format!("ghs_{}", "x".repeat(36));
        assert!(validate_token(&server).is_ok());
    }

    #[test]
    fn test_classic_token_accepted() {
        assert!(validate_token(&classic_token()).is_ok());
    }

    #[test]
    fn test_short_token_rejected_with_length_reason() {
        let err = validate_token("abcdefghij").unwrap_err();
        assert_eq!(err, CredentialError::TokenTooShort { length: 10 });
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_short_prefixed_token_rejected() {
        let err = validate_token("ghp_abc").unwrap_err();
        assert!(matches!(err, CredentialError::TokenTooShort { .. }));
    }

    #[test]
    fn test_token_with_symbols_rejected() {
        let token = format!("{}!", classic_token());
        assert_eq!(validate_token(&token), Err(CredentialError::TokenFormat));

        let prefixed = format!("ghp_{}-", "a".repeat(36));
        assert_eq!(validate_token(&prefixed), Err(CredentialError::TokenFormat));
    }

    #[test]
    fn test_empty_and_oversized_tokens() {
        assert_eq!(validate_token(""), Err(CredentialError::MissingToken));
        assert!(matches!(
            validate_token(&"a".repeat(256)),
            Err(CredentialError::TokenTooLong { length: 256 })
        ));
    }

    #[test]
    fn test_repo_slug_valid() {
        let slug = RepoSlug::parse("octo-org/my_repo.rs").unwrap();
        assert_eq!(slug.owner(), "octo-org");
        assert_eq!(slug.name(), "my_repo.rs");
        assert_eq!(slug.to_string(), "octo-org/my_repo.rs");
    }

    #[test]
    fn test_repo_without_slash_rejected() {
        let err = RepoSlug::parse("owner").unwrap_err();
        assert_eq!(err, CredentialError::RepositoryFormat);
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_owner_starting_with_hyphen_rejected() {
        assert_eq!(
            RepoSlug::parse("-bad/repo"),
            Err(CredentialError::InvalidOwner)
        );
    }

    #[test]
    fn test_repo_name_with_space_rejected() {
        assert_eq!(
            RepoSlug::parse("owner/repo name"),
            Err(CredentialError::InvalidName)
        );
    }

    #[test]
    fn test_repo_empty_segments() {
        assert_eq!(RepoSlug::parse(""), Err(CredentialError::MissingRepository));
        assert_eq!(RepoSlug::parse("/repo"), Err(CredentialError::EmptyOwner));
        assert_eq!(RepoSlug::parse("owner/"), Err(CredentialError::EmptyName));
        assert_eq!(
            RepoSlug::parse("a/b/c"),
            Err(CredentialError::RepositoryFormat)
        );
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::validate(&classic_token(), "owner/repo").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains(&classic_token()));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_credentials_token_checked_before_repo() {
        let err = Credentials::validate("short", "owner").unwrap_err();
        assert!(matches!(err, CredentialError::TokenTooShort { .. }));
    }
}
