//! Persisted snapshot of the provider's rate-limit quotas.
//!
//! Only the most recent snapshot is kept: the counters live under
//! [`API_INFO_KEY`] and the capture instant under [`API_INFO_CACHED_AT_KEY`],
//! both rewritten together on every fetch.

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key holding the JSON-encoded [`RateLimits`].
pub const API_INFO_KEY: &str = "api_info";

/// Key holding the RFC 3339 capture instant of the counters.
pub const API_INFO_CACHED_AT_KEY: &str = "api_info_cached_at";

/// Quota counters as reported by the provider's response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    #[serde(rename = "max_requests_per_minute")]
    pub max_per_minute: u32,
    #[serde(rename = "remaining_requests")]
    pub remaining_per_minute: u32,
    #[serde(rename = "max_requests_per_day")]
    pub max_per_day: u32,
    #[serde(rename = "remaining_requests_today")]
    pub remaining_per_day: u32,
}

impl RateLimits {
    /// A zero per-minute maximum means no information was ever captured.
    pub fn is_known(&self) -> bool {
        self.max_per_minute != 0
    }
}

/// Counters plus the instant they were captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitState {
    pub limits: RateLimits,
    pub captured_at: DateTime<Utc>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self { limits: RateLimits::default(), captured_at: DateTime::<Utc>::UNIX_EPOCH }
    }
}

impl RateLimitState {
    pub fn new(limits: RateLimits, captured_at: DateTime<Utc>) -> Self {
        Self { limits, captured_at }
    }

    /// Time since capture; since the epoch when nothing was ever captured.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.captured_at).to_std().unwrap_or_default()
    }
}

impl CacheDb {
    /// Persist `limits` and their capture instant in one transaction.
    pub async fn save_rate_limits(&self, limits: &RateLimits, captured_at: DateTime<Utc>) -> Result<(), Error> {
        let counters = serde_json::to_vec(limits).map_err(|e| Error::Encode(e.to_string()))?;
        let stamp = captured_at.to_rfc3339().into_bytes();

        self.set_all(vec![(API_INFO_KEY.to_string(), counters), (API_INFO_CACHED_AT_KEY.to_string(), stamp)])
            .await
    }

    /// Load the last snapshot.
    ///
    /// Never fails: if either half is missing or unreadable the zero state
    /// (zero counters, epoch timestamp) is returned.
    pub async fn load_rate_limits(&self) -> RateLimitState {
        match (self.read_limits().await, self.read_captured_at().await) {
            (Ok(limits), Ok(captured_at)) => RateLimitState { limits, captured_at },
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(error = %e, "no usable rate-limit snapshot in cache");
                RateLimitState::default()
            }
        }
    }

    /// Instant of the last capture, or the epoch if there is none.
    pub async fn rate_limits_captured_at(&self) -> DateTime<Utc> {
        self.read_captured_at()
            .await
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Time elapsed since the last recorded capture.
    pub async fn caching_age(&self, now: DateTime<Utc>) -> Duration {
        let captured_at = self.rate_limits_captured_at().await;
        now.signed_duration_since(captured_at).to_std().unwrap_or_default()
    }

    async fn read_limits(&self) -> Result<RateLimits, Error> {
        let bytes = self
            .get(API_INFO_KEY)
            .await?
            .ok_or_else(|| Error::Decode(format!("{API_INFO_KEY} not set")))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }

    async fn read_captured_at(&self) -> Result<DateTime<Utc>, Error> {
        let bytes = self
            .get(API_INFO_CACHED_AT_KEY)
            .await?
            .ok_or_else(|| Error::Decode(format!("{API_INFO_CACHED_AT_KEY} not set")))?;
        let text = String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn limits() -> RateLimits {
        RateLimits { max_per_minute: 60, remaining_per_minute: 59, max_per_day: 10_000, remaining_per_day: 9_876 }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now();

        db.save_rate_limits(&limits(), now).await.unwrap();

        let state = db.load_rate_limits().await;
        assert_eq!(state.limits, limits());
        assert_eq!(state.captured_at, now);
    }

    #[tokio::test]
    async fn test_load_empty_store_is_zero_state() {
        let db = CacheDb::open_in_memory().await.unwrap();

        let state = db.load_rate_limits().await;
        assert_eq!(state, RateLimitState::default());
        assert_eq!(state.captured_at.timestamp(), 0);
        assert!(!state.limits.is_known());
    }

    #[tokio::test]
    async fn test_load_with_unreadable_timestamp_is_zero_state() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.save_rate_limits(&limits(), Utc::now()).await.unwrap();
        db.set(API_INFO_CACHED_AT_KEY, b"yesterday-ish".to_vec()).await.unwrap();

        assert_eq!(db.load_rate_limits().await, RateLimitState::default());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let earlier = Utc::now() - TimeDelta::hours(1);
        db.save_rate_limits(&limits(), earlier).await.unwrap();

        let newer = RateLimits { remaining_per_minute: 3, ..limits() };
        let now = Utc::now();
        db.save_rate_limits(&newer, now).await.unwrap();

        let state = db.load_rate_limits().await;
        assert_eq!(state.limits.remaining_per_minute, 3);
        assert_eq!(state.captured_at, now);
    }

    #[tokio::test]
    async fn test_counters_use_snake_case_keys() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.save_rate_limits(&limits(), Utc::now()).await.unwrap();

        let raw = db.get(API_INFO_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["max_requests_per_minute"], 60);
        assert_eq!(json["remaining_requests_today"], 9_876);
    }

    #[tokio::test]
    async fn test_caching_age() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now();

        let never = db.caching_age(now).await;
        assert!(never > Duration::from_secs(50 * 365 * 24 * 3600));

        db.save_rate_limits(&limits(), now - TimeDelta::seconds(42)).await.unwrap();
        assert_eq!(db.caching_age(now).await, Duration::from_secs(42));
    }
}
