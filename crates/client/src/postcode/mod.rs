//! Postcode API client.
//!
//! Provides the HTTP side of a lookup: request validation, the call itself
//! and mapping of the response onto a [`FetchResult`].
//!
//! ### API
//!
//! - **Endpoint**: `https://postcode.tech/api/v1/postcode/full?postcode=P&number=N`
//! - **Authentication**: `Authorization: Bearer <token>` header.
//! - **Quota headers**: `X-RateLimit-Limit`, `X-RateLimit-Remaining`,
//!   `X-API-Limit`, `X-API-Remaining`; read from every response, errors included.
//! - **Status mapping**: 200 success, 404 unknown combination, 429 rate limited,
//!   anything else rejected.
//! - No retries; the configured timeout bounds each request.

pub mod error;
pub mod request;
pub mod response;

pub use error::PostcodeError;
pub use request::LookupRequest;
pub use response::{ApiAddressResponse, outcome_for, rate_limits_from_headers};

use async_trait::async_trait;
use pcapi_core::{AddressFetcher, AppConfig, FetchOutcome, FetchResult};
use reqwest::header;
use std::time::{Duration, Instant};

/// Postcode API client configuration.
#[derive(Debug, Clone)]
pub struct PostcodeConfig {
    pub api_token: String,
    /// Base URL, ending in `/`.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Endpoint, timeout and user agent come from `AppConfig::default()`; the token is empty.
impl Default for PostcodeConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        let timeout = app.timeout();
        Self { api_token: String::new(), base_url: app.endpoint, timeout, user_agent: app.user_agent }
    }
}

impl PostcodeConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PostcodeError> {
        let api_token = config
            .require_api_token()
            .map_err(|_| PostcodeError::MissingApiToken)?
            .to_string();

        Ok(Self {
            api_token,
            base_url: config.endpoint.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Postcode API client.
#[derive(Debug, Clone)]
pub struct PostcodeClient {
    http: reqwest::Client,
    config: PostcodeConfig,
}

impl PostcodeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PostcodeConfig) -> Result<Self, PostcodeError> {
        if config.api_token.is_empty() {
            return Err(PostcodeError::MissingApiToken);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PostcodeError::from)?;

        Ok(Self { http, config })
    }

    /// URL of the full-address lookup.
    pub fn lookup_url(&self) -> String {
        format!("{}postcode/full", self.config.base_url)
    }

    async fn send(&self, req: &LookupRequest) -> Result<reqwest::Response, PostcodeError> {
        req.validate()?;

        let response = self
            .http
            .get(self.lookup_url())
            .bearer_auth(&self.config.api_token)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(req)
            .send()
            .await?;

        Ok(response)
    }
}

#[async_trait]
impl AddressFetcher for PostcodeClient {
    async fn fetch(&self, postcode: &str, number: &str) -> FetchResult {
        let req = LookupRequest::new(postcode, number);
        let start = Instant::now();

        tracing::debug!(postcode, number, "querying postcode API");

        let response = match self.send(&req).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(postcode, number, error = %e, "postcode API request failed");
                return FetchResult::unsent();
            }
        };

        let status = response.status();
        let limits = rate_limits_from_headers(response.headers());
        tracing::debug!(%status, elapsed = ?start.elapsed(), "postcode API responded");

        match response.bytes().await {
            Ok(body) => FetchResult::new(outcome_for(status, &body), limits),
            Err(e) => {
                tracing::warn!(postcode, number, error = %PostcodeError::from(e), "failed to read postcode API response");
                FetchResult::new(FetchOutcome::TransportError, limits)
            }
        }
    }
}
