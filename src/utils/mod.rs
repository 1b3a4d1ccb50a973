//! Utility functions and helpers.

pub mod http;
pub mod log;

use scraper::Selector;
use url::form_urlencoded::byte_serialize;

use crate::error::{AppError, Result};
use crate::models::RIP_PLACEHOLDER;

/// Parse a CSS selector, mapping failures to [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Keep only the digits of an identifier.
///
/// `"123.45.678-9"` becomes `"123456789"`.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Fill an endpoint template with a URL-encoded identifier.
pub fn endpoint_url(template: &str, identifier: &str) -> String {
    let encoded: String = byte_serialize(identifier.as_bytes()).collect();
    template.replace(RIP_PLACEHOLDER, &encoded)
}

/// Compare two URLs, ignoring differences a URL parser normalizes away.
pub fn same_url(a: &str, b: &str) -> bool {
    match (url::Url::parse(a), url::Url::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
