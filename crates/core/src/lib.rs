//! Core types and shared functionality for pcapi.
//!
//! This crate provides:
//! - Address and lookup result types
//! - Key-value cache with SQLite backend, including the quota snapshot
//! - The cache-augmented lookup path
//! - Unified error types
//! - Configuration structures

pub mod address;
pub mod cache;
pub mod config;
pub mod error;
pub mod lookup;

pub use address::{AddressRecord, Geo, LookupResult, ShortAddress, cache_key};
pub use cache::{CacheDb, CacheEntry, RateLimitState, RateLimits};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use lookup::{AddressFetcher, FetchOutcome, FetchResult, QuotaReport, Resolver};
