//! Postcode API response types, quota headers and status mapping.

use pcapi_core::{AddressRecord, FetchOutcome, Geo, RateLimits};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

/// Requests allowed per minute.
pub const HEADER_MINUTE_LIMIT: &str = "x-ratelimit-limit";
/// Requests left in the current minute.
pub const HEADER_MINUTE_REMAINING: &str = "x-ratelimit-remaining";
/// Requests allowed per day.
pub const HEADER_DAY_LIMIT: &str = "x-api-limit";
/// Requests left today.
pub const HEADER_DAY_REMAINING: &str = "x-api-remaining";

/// Raw body of a successful `postcode/full` response.
#[derive(Debug, Deserialize)]
pub struct ApiAddressResponse {
    pub postcode: String,
    pub number: u32,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub geo: Option<ApiGeo>,
}

/// Coordinates as sent by the provider.
#[derive(Debug, Deserialize)]
pub struct ApiGeo {
    pub lat: f64,
    pub lon: f64,
}

impl From<ApiAddressResponse> for AddressRecord {
    fn from(raw: ApiAddressResponse) -> Self {
        AddressRecord {
            postcode: raw.postcode,
            number: raw.number,
            street: raw.street,
            city: raw.city,
            municipality: raw.municipality,
            province: raw.province,
            geo: raw.geo.map(|g| Geo { lat: g.lat, lon: g.lon }).unwrap_or_default(),
        }
    }
}

/// Read the quota counters from response headers.
///
/// Missing or unparsable values count as zero.
pub fn rate_limits_from_headers(headers: &HeaderMap) -> RateLimits {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0)
    };

    RateLimits {
        max_per_minute: read(HEADER_MINUTE_LIMIT),
        remaining_per_minute: read(HEADER_MINUTE_REMAINING),
        max_per_day: read(HEADER_DAY_LIMIT),
        remaining_per_day: read(HEADER_DAY_REMAINING),
    }
}

/// Map a response status and body onto a fetch outcome.
///
/// 200 with a readable body is a success, 404 a definitive miss, 429 a
/// rate limit; any other status is a rejection. An unreadable 200 body is a
/// transport failure.
pub fn outcome_for(status: StatusCode, body: &[u8]) -> FetchOutcome {
    match status {
        StatusCode::OK => match serde_json::from_slice::<ApiAddressResponse>(body) {
            Ok(raw) => FetchOutcome::Success(raw.into()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse postcode API response");
                FetchOutcome::TransportError
            }
        },
        StatusCode::NOT_FOUND => FetchOutcome::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchOutcome::RateLimited,
        other => FetchOutcome::Rejected { status: other.as_u16() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const FIXTURE_JSON: &str = r#"{
        "postcode": "6931XE",
        "number": 130,
        "street": "Kerkstraat",
        "city": "Westervoort",
        "municipality": "Westervoort",
        "province": "Gelderland",
        "geo": {"lat": 51.9566, "lon": 5.9739}
    }"#;

    #[test]
    fn test_success_maps_to_record() {
        let outcome = outcome_for(StatusCode::OK, FIXTURE_JSON.as_bytes());

        let FetchOutcome::Success(record) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(record.postcode, "6931XE");
        assert_eq!(record.number, 130);
        assert_eq!(record.street, "Kerkstraat");
        assert_eq!(record.province, "Gelderland");
        assert_eq!(record.geo, Geo { lat: 51.9566, lon: 5.9739 });
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"postcode": "1234AB", "number": 5, "street": "Dorpsstraat", "city": "Ergens"}"#;
        let FetchOutcome::Success(record) = outcome_for(StatusCode::OK, json.as_bytes()) else {
            panic!("expected success");
        };
        assert_eq!(record.municipality, "");
        assert_eq!(record.geo, Geo::default());
    }

    #[test]
    fn test_unreadable_body_is_transport_error() {
        assert_eq!(outcome_for(StatusCode::OK, b"<html>oops</html>"), FetchOutcome::TransportError);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(outcome_for(StatusCode::NOT_FOUND, b""), FetchOutcome::NotFound);
        assert_eq!(outcome_for(StatusCode::TOO_MANY_REQUESTS, b""), FetchOutcome::RateLimited);
        assert_eq!(
            outcome_for(StatusCode::INTERNAL_SERVER_ERROR, b""),
            FetchOutcome::Rejected { status: 500 }
        );
        assert_eq!(outcome_for(StatusCode::UNAUTHORIZED, b"{}"), FetchOutcome::Rejected { status: 401 });
    }

    #[test]
    fn test_rate_limits_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_MINUTE_LIMIT, HeaderValue::from_static("60"));
        headers.insert(HEADER_MINUTE_REMAINING, HeaderValue::from_static("57"));
        headers.insert(HEADER_DAY_LIMIT, HeaderValue::from_static("10000"));
        headers.insert(HEADER_DAY_REMAINING, HeaderValue::from_static("9321"));

        let limits = rate_limits_from_headers(&headers);
        assert_eq!(
            limits,
            RateLimits { max_per_minute: 60, remaining_per_minute: 57, max_per_day: 10_000, remaining_per_day: 9_321 }
        );
    }

    #[test]
    fn test_rate_limits_tolerate_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_MINUTE_LIMIT, HeaderValue::from_static("lots"));
        headers.insert(HEADER_DAY_LIMIT, HeaderValue::from_static("-3"));

        assert_eq!(rate_limits_from_headers(&headers), RateLimits::default());
    }
}
