//! Address types returned by a lookup.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Marker stored for a postcode/number pair the provider does not know.
pub const UNKNOWN_COMBINATION: &str = "unknown combination";

/// Marker returned when the provider rate-limited the request.
pub const TOO_MANY_REQUESTS: &str = "too many requests";

/// Marker returned for any other non-success response from the provider.
pub const API_ERROR: &str = "api error";

/// Geographic coordinates of an address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: f64,
    pub lon: f64,
}

/// A resolved address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    pub postcode: String,
    pub number: u32,
    pub street: String,
    pub city: String,
    pub municipality: String,
    pub province: String,
    pub geo: Geo,
}

/// Street and city only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortAddress {
    pub street: String,
    pub city: String,
}

impl From<&AddressRecord> for ShortAddress {
    fn from(record: &AddressRecord) -> Self {
        Self { street: record.street.clone(), city: record.city.clone() }
    }
}

/// Outcome of a lookup that produced information.
///
/// Negative outcomes are data, not errors: they carry their own caching
/// rules and never hold address fields.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(AddressRecord),
    /// The provider answered "not found". Cached as a stable fact.
    UnknownCombination,
    /// The provider rate-limited the request. Never cached.
    TooManyRequests,
    /// Any other non-success HTTP status. Never cached.
    ApiError { status: u16 },
}

impl LookupResult {
    /// The address, if this is a positive result.
    pub fn address(&self) -> Option<&AddressRecord> {
        match self {
            LookupResult::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Error marker for negative results, `None` for `Found`.
    pub fn error_marker(&self) -> Option<&'static str> {
        match self {
            LookupResult::Found(_) => None,
            LookupResult::UnknownCombination => Some(UNKNOWN_COMBINATION),
            LookupResult::TooManyRequests => Some(TOO_MANY_REQUESTS),
            LookupResult::ApiError { .. } => Some(API_ERROR),
        }
    }

    pub fn is_negative(&self) -> bool {
        !matches!(self, LookupResult::Found(_))
    }

    /// Project onto street and city. Negative results have no projection.
    pub fn short(&self) -> Option<ShortAddress> {
        self.address().map(ShortAddress::from)
    }
}

/// Positive results serialize as the address itself, negative ones as
/// `{"error": "<marker>"}`.
impl Serialize for LookupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LookupResult::Found(record) => record.serialize(serializer),
            negative => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &negative.error_marker())?;
                map.end()
            }
        }
    }
}

/// Cache key for a postcode/number pair: plain concatenation, no separator.
pub fn cache_key(postcode: &str, number: &str) -> String {
    format!("{postcode}{number}")
}
