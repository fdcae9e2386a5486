//! Extraction of postcode and house number from a single string.

use regex::Regex;
use std::sync::LazyLock;

/// Four digits, two uppercase letters, optional whitespace, one or more digits.
static POSTCODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{4}[A-Z]{2})\s*([0-9]+)").expect("postcode pattern is valid"));

/// Split e.g. `"6931XE130"` or `"6931XE 130"` into `("6931XE", "130")`.
///
/// The first match anywhere in `text` wins; `None` when nothing matches.
pub fn parse_combined(text: &str) -> Option<(String, String)> {
    let captures = POSTCODE_NUMBER.captures(text)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}
