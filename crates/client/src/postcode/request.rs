//! Lookup request parameters and validation.

use serde::Serialize;

use super::PostcodeError;

/// Query parameters for `GET postcode/full`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LookupRequest {
    pub postcode: String,
    pub number: String,
}

impl LookupRequest {
    pub fn new(postcode: impl Into<String>, number: impl Into<String>) -> Self {
        Self { postcode: postcode.into(), number: number.into() }
    }

    /// Reject requests the provider could only answer with an error.
    pub fn validate(&self) -> Result<(), PostcodeError> {
        if self.postcode.trim().is_empty() {
            return Err(PostcodeError::InvalidQuery("postcode cannot be empty".to_string()));
        }

        if self.number.is_empty() || !self.number.chars().all(|c| c.is_ascii_digit()) {
            return Err(PostcodeError::InvalidQuery(format!(
                "house number must be digits, got {:?}",
                self.number
            )));
        }

        Ok(())
    }
}
