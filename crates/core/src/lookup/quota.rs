//! Quota report built from the rate-limit snapshot.

use crate::cache::{CacheDb, RateLimitState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Literal reported when no rate-limit information was ever captured.
pub const NOT_AVAILABLE: &str = "n/a";

/// Provider quotas plus when they were captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaReport {
    pub max_requests_per_minute: u32,
    pub remaining_requests: u32,
    pub max_requests_per_day: u32,
    pub remaining_requests_today: u32,
    pub caching_time: DateTime<Utc>,
    /// Seconds.
    pub time_since_last_cache: u64,
}

impl QuotaReport {
    pub fn from_state(state: &RateLimitState, now: DateTime<Utc>) -> Self {
        Self {
            max_requests_per_minute: state.limits.max_per_minute,
            remaining_requests: state.limits.remaining_per_minute,
            max_requests_per_day: state.limits.max_per_day,
            remaining_requests_today: state.limits.remaining_per_day,
            caching_time: state.captured_at,
            time_since_last_cache: state.age(now).as_secs(),
        }
    }

    /// Like [`from_state`](Self::from_state), but `None` when no counters were ever captured.
    pub fn known(state: &RateLimitState, now: DateTime<Utc>) -> Option<Self> {
        state.limits.is_known().then(|| Self::from_state(state, now))
    }
}

/// Render a report as JSON, or [`NOT_AVAILABLE`] when there is none.
pub fn quota_json(report: Option<&QuotaReport>) -> String {
    let Some(report) = report else {
        return NOT_AVAILABLE.to_string();
    };
    serde_json::to_string(report).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize quota report");
        NOT_AVAILABLE.to_string()
    })
}

impl CacheDb {
    /// Quota report from the persisted snapshot alone.
    pub async fn quota_report(&self) -> Option<QuotaReport> {
        QuotaReport::known(&self.load_rate_limits().await, Utc::now())
    }
}
