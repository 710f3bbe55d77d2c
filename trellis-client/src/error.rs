//! Error types for the GitHub client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the GitHub API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, TLS, connection reset...)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body returned by the API
        message: String,
    },

    /// A non-forced ref update was rejected because the branch moved
    #[error("Reference update rejected (status {status}): {message}")]
    Conflict {
        status: u16,
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::api_error(422, r#"{"message":"Update is not a fast forward"}"#);
        assert!(matches!(err, ClientError::ApiError { status: 422, .. }));
        assert!(err.to_string().contains("status 422"));
    }
}
