//! HTTP cache control module
//!
//! `ETag` generation, conditional request handling and `Cache-Control` values.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate `ETag` using fast hashing
///
/// Returns a quoted string, e.g. `"abc123def"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma separated list, and the `*` wildcard.
/// Weak validators (`W/"..."`) compare equal to their strong form.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Cache policy per kind of response
#[derive(Debug, Clone, Copy)]
pub enum CacheControl {
    /// Static assets: cacheable by anyone for the given seconds
    Public(u32),
    /// Rendered pages: may be stored, but must be revalidated with the `ETag`
    Revalidate,
}

impl CacheControl {
    /// Convert to Cache-Control header value
    pub fn header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::Revalidate => "no-cache".to_string(),
        }
    }
}
