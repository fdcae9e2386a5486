//! Cached lookup results and their on-disk encoding.
//!
//! An entry is stored as self-describing JSON. Negative results collapse into
//! an `error` marker next to empty address fields, the same shape the
//! provider's own error responses have.

use super::connection::CacheDb;
use crate::Error;
use crate::address::{API_ERROR, AddressRecord, LookupResult, TOO_MANY_REQUESTS, UNKNOWN_COMBINATION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A lookup result together with the instant it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub result: LookupResult,
    pub captured_at: DateTime<Utc>,
}

/// Wire form of a [`CacheEntry`].
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(flatten)]
    record: AddressRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(result: LookupResult, captured_at: DateTime<Utc>) -> Self {
        Self { result, captured_at }
    }

    /// Time elapsed between capture and `now`.
    ///
    /// A capture instant in the future (clock moved backwards) counts as age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.captured_at).to_std().unwrap_or_default()
    }

    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let stored = StoredEntry {
            record: self.result.address().cloned().unwrap_or_default(),
            error: self.result.error_marker().map(str::to_string),
            status: match self.result {
                LookupResult::ApiError { status } => Some(status),
                _ => None,
            },
            cached_at: self.captured_at,
        };

        serde_json::to_vec(&stored).map_err(|e| Error::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let stored: StoredEntry = serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;

        let result = match stored.error.as_deref() {
            None => LookupResult::Found(stored.record),
            Some(UNKNOWN_COMBINATION) => LookupResult::UnknownCombination,
            Some(TOO_MANY_REQUESTS) => LookupResult::TooManyRequests,
            Some(API_ERROR) => LookupResult::ApiError { status: stored.status.unwrap_or_default() },
            Some(other) => return Err(Error::Decode(format!("unknown error marker: {other}"))),
        };

        Ok(Self { result, captured_at: stored.cached_at })
    }
}

impl CacheDb {
    /// Read and decode the entry stored under `key`.
    ///
    /// Read failures and undecodable bytes are logged and reported as an
    /// absent entry; corrupt cache data is never an error for the caller.
    pub async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        let bytes = match self.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match CacheEntry::decode(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode `entry` and store it under `key`.
    pub async fn put_entry(&self, key: &str, entry: &CacheEntry) -> Result<(), Error> {
        self.set(key, entry.encode()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Geo;
    use chrono::TimeDelta;

    fn found() -> LookupResult {
        LookupResult::Found(AddressRecord {
            postcode: "6931XE".into(),
            number: 130,
            street: "Kerkstraat".into(),
            city: "Westervoort".into(),
            municipality: "Westervoort".into(),
            province: "Gelderland".into(),
            geo: Geo { lat: 51.9566, lon: 5.9739 },
        })
    }

    #[test]
    fn test_roundtrip_preserves_each_variant() {
        let captured_at = Utc::now();
        for result in [
            found(),
            LookupResult::UnknownCombination,
            LookupResult::TooManyRequests,
            LookupResult::ApiError { status: 503 },
        ] {
            let entry = CacheEntry::new(result, captured_at);
            let decoded = CacheEntry::decode(&entry.encode().unwrap()).unwrap();
            assert_eq!(decoded, entry);
        }
    }

    #[test]
    fn test_encoding_is_field_tagged() {
        let entry = CacheEntry::new(LookupResult::UnknownCombination, Utc::now());
        let json: serde_json::Value = serde_json::from_slice(&entry.encode().unwrap()).unwrap();

        assert_eq!(json["error"], "unknown combination");
        assert_eq!(json["street"], "");
        assert!(json.get("cached_at").is_some());
    }

    #[test]
    fn test_decode_garbage() {
        let result = CacheEntry::decode(b"not json at all");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_unknown_marker() {
        let bytes = br#"{"postcode":"","number":0,"street":"","city":"","municipality":"","province":"",
            "geo":{"lat":0.0,"lon":0.0},"error":"something new","cached_at":"2024-01-01T00:00:00Z"}"#;
        assert!(matches!(CacheEntry::decode(bytes), Err(Error::Decode(_))));
    }

    #[test]
    fn test_age_clamps_future_capture() {
        let now = Utc::now();
        let entry = CacheEntry::new(found(), now + TimeDelta::minutes(5));
        assert_eq!(entry.age(now), Duration::ZERO);

        let entry = CacheEntry::new(found(), now - TimeDelta::seconds(90));
        assert_eq!(entry.age(now), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_put_and_get_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = CacheEntry::new(found(), Utc::now());

        db.put_entry("6931XE130", &entry).await.unwrap();

        assert_eq!(db.get_entry("6931XE130").await, Some(entry));
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_absent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set("6931XE130", b"{truncated".to_vec()).await.unwrap();

        assert!(db.get_entry("6931XE130").await.is_none());
    }
}
