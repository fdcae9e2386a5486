//! Checks applied to a loaded `AppConfig` before anything is opened.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Errors raised while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG_ERROR: could not load configuration: {0}")]
    LoadFailed(String),

    #[error("CONFIG_ERROR: {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("CONFIG_ERROR: {field} is not set ({hint})")]
    Missing { field: String, hint: String },
}

/// Accepted request timeout range, in milliseconds.
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Reject values the resolver or the HTTP client cannot work with.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` naming the first offending field: a zero TTL,
    /// a timeout outside 100ms..=5min, a blank user agent, or an endpoint
    /// that is not an http(s) base URL ending in `/`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }

        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", "must be between 100 and 300000 milliseconds"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be blank"));
        }

        let endpoint = Url::parse(&self.endpoint).map_err(|e| invalid("endpoint", e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid("endpoint", "must use http or https"));
        }
        if !endpoint.path().ends_with('/') {
            return Err(invalid("endpoint", "must end with '/'"));
        }

        if self.cache_ttl_secs < 6 {
            tracing::warn!(
                cache_ttl_secs = self.cache_ttl_secs,
                "cache TTL is shorter than six seconds; negative results will never be served from cache"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        assert_eq!(rejected_field(&config).as_deref(), Some("cache_ttl_secs"));
    }

    #[test]
    fn test_timeout_bounds() {
        for timeout_ms in [0, 99, 300_001] {
            let config = AppConfig { timeout_ms, ..Default::default() };
            assert_eq!(rejected_field(&config).as_deref(), Some("timeout_ms"), "timeout {timeout_ms}");
        }
        for timeout_ms in [100, 300_000] {
            let config = AppConfig { timeout_ms, ..Default::default() };
            assert!(config.validate().is_ok(), "timeout {timeout_ms}");
        }
    }

    #[test]
    fn test_blank_user_agent_rejected() {
        let config = AppConfig { user_agent: "  ".into(), ..Default::default() };
        assert_eq!(rejected_field(&config).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_endpoint_rules() {
        for endpoint in ["not a url", "ftp://postcode.tech/api/v1/", "https://postcode.tech/api/v1"] {
            let config = AppConfig { endpoint: endpoint.into(), ..Default::default() };
            assert_eq!(rejected_field(&config).as_deref(), Some("endpoint"), "endpoint {endpoint}");
        }

        let config = AppConfig { endpoint: "http://localhost:8080/".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_one_second_ttl_is_accepted() {
        let config = AppConfig { cache_ttl_secs: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
