//! SQLite-backed key-value cache for lookup results and quota snapshots.
//!
//! - One `kv` table with upsert semantics
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - JSON encoding of cached lookup results
//! - Rate-limit snapshot under fixed keys

pub mod connection;
pub mod entry;
pub mod migrations;
pub mod rate_limit;
pub mod store;

pub use crate::Error;

pub use connection::{CacheDb, DEFAULT_CACHE_PATH};
pub use entry::CacheEntry;
pub use rate_limit::{API_INFO_CACHED_AT_KEY, API_INFO_KEY, RateLimitState, RateLimits};
