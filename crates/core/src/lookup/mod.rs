//! Cache-augmented address lookup.
//!
//! [`Resolver`] answers lookups from the cache when the freshness policy
//! allows it and otherwise asks its [`AddressFetcher`], writing stable results
//! back and refreshing the quota snapshot from every response.
//!
//! ### Caching rules
//! - Positive results are fresh for the configured TTL.
//! - "Unknown combination" results are fresh for `TTL / 6` and then revalidated.
//! - Rate-limited and other rejected responses are returned but never stored.
//! - Transport failures yield `None` and write nothing.
//!
//! ### Concurrency
//! Read, decide, fetch and write are separate steps. Two concurrent lookups
//! of the same absent key may both fetch and both write; the last write wins.

pub mod combined;
pub mod fetcher;
pub mod policy;
pub mod quota;

pub use combined::parse_combined;
pub use fetcher::{AddressFetcher, FetchOutcome, FetchResult};
pub use policy::{CacheDecision, NEGATIVE_TTL_DIVISOR, decide};
pub use quota::{NOT_AVAILABLE, QuotaReport, quota_json};

use crate::address::{LookupResult, ShortAddress, cache_key};
use crate::cache::{CacheDb, CacheEntry, RateLimitState, RateLimits};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lookup client combining the cache with a remote fetcher.
#[derive(Debug)]
pub struct Resolver<F> {
    db: CacheDb,
    fetcher: F,
    ttl: Duration,
    limits: Mutex<RateLimitState>,
}

impl<F: AddressFetcher> Resolver<F> {
    /// Create a resolver, seeding the in-memory quota snapshot from the store.
    pub async fn new(db: CacheDb, fetcher: F, ttl: Duration) -> Self {
        let limits = db.load_rate_limits().await;
        Self { db, fetcher, ttl, limits: Mutex::new(limits) }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve a postcode/number pair.
    ///
    /// `None` means no information is available (the provider could not be
    /// reached or sent something unreadable).
    pub async fn resolve(&self, postcode: &str, number: &str) -> Option<LookupResult> {
        let key = cache_key(postcode, number);

        match decide(self.db.get_entry(&key).await, Utc::now(), self.ttl) {
            CacheDecision::Serve(result) => {
                tracing::debug!(key = %key, negative = result.is_negative(), "serving lookup from cache");
                Some(result)
            }
            CacheDecision::Fetch => {
                tracing::debug!(key = %key, "cache miss, fetching");
                self.fetch_and_store(postcode, number, &key).await
            }
        }
    }

    /// Same as [`resolve`](Self::resolve), reduced to street and city.
    ///
    /// Every negative result collapses to `None`.
    pub async fn resolve_short(&self, postcode: &str, number: &str) -> Option<ShortAddress> {
        self.resolve(postcode, number).await?.short()
    }

    /// Resolve a combined string such as `"6931XE130"`.
    ///
    /// Returns `None` without any lookup if the string does not contain a
    /// postcode followed by a house number.
    pub async fn resolve_from_combined(&self, text: &str) -> Option<LookupResult> {
        let Some((postcode, number)) = parse_combined(text) else {
            tracing::debug!(text, "no postcode and house number found");
            return None;
        };
        self.resolve(&postcode, &number).await
    }

    /// Current in-memory quota snapshot.
    pub fn rate_limits(&self) -> RateLimitState {
        *self.lock_limits()
    }

    /// Quota report, or `None` when nothing was ever captured.
    ///
    /// Falls back to the store when memory holds no counters.
    pub async fn quota_snapshot(&self) -> Option<QuotaReport> {
        let mut state = self.rate_limits();

        if !state.limits.is_known() {
            state = self.db.load_rate_limits().await;
            if state.limits.is_known() {
                tracing::debug!(captured_at = %state.captured_at, "rate-limit info loaded from cache");
                *self.lock_limits() = state;
            } else {
                tracing::debug!("rate-limit info not available");
            }
        }

        QuotaReport::known(&state, Utc::now())
    }

    /// The quota report as JSON, or the literal `n/a`.
    pub async fn quota_report_json(&self) -> String {
        quota_json(self.quota_snapshot().await.as_ref())
    }

    async fn fetch_and_store(&self, postcode: &str, number: &str, key: &str) -> Option<LookupResult> {
        let FetchResult { outcome, limits } = self.fetcher.fetch(postcode, number).await;
        let now = Utc::now();

        if let Some(limits) = limits {
            self.record_rate_limits(limits, now).await;
        }

        let result = match outcome {
            FetchOutcome::Success(record) => LookupResult::Found(record),
            FetchOutcome::NotFound => LookupResult::UnknownCombination,
            FetchOutcome::RateLimited => {
                tracing::warn!(key, "provider rate limit reached");
                return Some(LookupResult::TooManyRequests);
            }
            FetchOutcome::Rejected { status } => {
                tracing::warn!(key, status, "provider rejected lookup");
                return Some(LookupResult::ApiError { status });
            }
            FetchOutcome::TransportError => return None,
        };

        let entry = CacheEntry::new(result, now);
        if let Err(e) = self.db.put_entry(key, &entry).await {
            tracing::warn!(key, error = %e, "failed to cache lookup result");
        }

        Some(entry.result)
    }

    async fn record_rate_limits(&self, limits: RateLimits, now: DateTime<Utc>) {
        *self.lock_limits() = RateLimitState::new(limits, now);

        if let Err(e) = self.db.save_rate_limits(&limits, now).await {
            tracing::warn!(error = %e, "failed to persist rate-limit info");
        }
    }

    fn lock_limits(&self) -> MutexGuard<'_, RateLimitState> {
        self.limits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
