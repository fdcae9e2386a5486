//! Freshness policy for cached lookups.

use crate::address::LookupResult;
use crate::cache::CacheEntry;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Negative results are trusted for `ttl / NEGATIVE_TTL_DIVISOR`.
pub const NEGATIVE_TTL_DIVISOR: u32 = 6;

/// What to do with whatever the cache returned for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheDecision {
    /// Serve this cached result without touching the network.
    Serve(LookupResult),
    /// Go to the provider.
    Fetch,
}

/// Apply the freshness rules to a cache read.
///
/// - absent: fetch
/// - positive younger than `ttl`: serve
/// - negative younger than `ttl / NEGATIVE_TTL_DIVISOR`: serve
/// - anything else is stale: fetch
pub fn decide(entry: Option<CacheEntry>, now: DateTime<Utc>, ttl: Duration) -> CacheDecision {
    let Some(entry) = entry else {
        return CacheDecision::Fetch;
    };

    let age = entry.age(now);
    let window = if entry.result.is_negative() { ttl / NEGATIVE_TTL_DIVISOR } else { ttl };

    if age < window { CacheDecision::Serve(entry.result) } else { CacheDecision::Fetch }
}
