//! The seam between the lookup path and whatever talks to the provider.

use crate::address::AddressRecord;
use crate::cache::RateLimits;
use async_trait::async_trait;

/// What the provider said about a postcode/number pair.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(AddressRecord),
    /// Definitive "this combination does not exist".
    NotFound,
    /// The request was rejected for exceeding the quota.
    RateLimited,
    /// Any other non-success status.
    Rejected { status: u16 },
    /// No usable answer: the request failed or the body could not be parsed.
    TransportError,
}

/// Outcome plus the quota headers of the response that produced it.
///
/// `limits` is `None` only when no response was received at all.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub outcome: FetchOutcome,
    pub limits: Option<RateLimits>,
}

impl FetchResult {
    pub fn new(outcome: FetchOutcome, limits: RateLimits) -> Self {
        Self { outcome, limits: Some(limits) }
    }

    /// The request never reached the provider.
    pub fn unsent() -> Self {
        Self { outcome: FetchOutcome::TransportError, limits: None }
    }
}

/// Fetches a single address from the remote provider.
///
/// Implementations never fail: every problem is folded into
/// [`FetchOutcome::TransportError`]. Timeouts are the implementation's job.
#[async_trait]
pub trait AddressFetcher: Send + Sync {
    async fn fetch(&self, postcode: &str, number: &str) -> FetchResult;
}
