//! Postcode API client error types.

use std::sync::Arc;

/// Errors from the postcode API client.
///
/// These never reach callers of the lookup path; [`super::PostcodeClient`]
/// folds them into a transport failure after logging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PostcodeError {
    /// No bearer token configured.
    #[error("missing API token: PCAPI_API_TOKEN not set")]
    MissingApiToken,

    /// Postcode or house number unusable for a request.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for PostcodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { PostcodeError::Timeout } else { PostcodeError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostcodeError::MissingApiToken;
        assert!(err.to_string().contains("API token"));

        let err = PostcodeError::InvalidQuery("postcode cannot be empty".to_string());
        assert!(err.to_string().contains("invalid query"));
    }
}
