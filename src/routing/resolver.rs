//! Request path resolution
//!
//! Turns the raw pieces of a request (host, request URI, query string) into
//! the logical content path and the URLs used to build links back into the
//! site. Pure string work, no filesystem access.

use crate::config::SiteConfig;

/// Token naming the front controller in non-rewritten URLs
const INVOCATION_MARKER: &str = "index.php";

/// Raw request inputs, as the hosting layer received them
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub host: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
}

/// Result of resolving a request against the site configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Content identifier, e.g. `getting-started/install`
    pub logical_path: String,
    /// Absolute URL of the site root, no trailing slash
    pub root_url: String,
    /// Prefix that turns a logical path into a link (`root/` or `root/index.php?`)
    pub index_url: String,
    /// The request named no page; the caller must redirect to the default one
    pub is_default: bool,
}

impl RequestPath {
    /// Absolute URL of a logical path
    pub fn link_to(&self, logical_path: &str) -> String {
        format!("{}{}", self.index_url, logical_path)
    }
}

/// Resolve the logical path and site URLs for one request
pub fn resolve(parts: RequestParts<'_>, site: &SiteConfig) -> RequestPath {
    // Everything before the query is the path of the front controller
    let rel_path = parts.uri.strip_suffix(parts.query).unwrap_or(parts.uri);
    let full_url = format!("http://{}{}", parts.host, rel_path);

    let root_url = full_url
        .replace(INVOCATION_MARKER, "")
        .replace('?', "")
        .trim_end_matches('/')
        .to_string();

    let index_url = build_index_url(&full_url, &root_url, site.use_rewrite);

    let query = parts.query.trim_matches('/');
    let (logical_path, is_default) = if query.is_empty() {
        (site.default_path.trim_matches('/').to_string(), true)
    } else {
        (query.to_string(), false)
    };

    RequestPath {
        logical_path,
        root_url,
        index_url,
        is_default,
    }
}

fn build_index_url(full_url: &str, root_url: &str, use_rewrite: bool) -> String {
    if use_rewrite {
        format!("{root_url}/")
    } else if full_url.contains(&format!("{INVOCATION_MARKER}?")) {
        full_url.to_string()
    } else {
        format!("{root_url}/{INVOCATION_MARKER}?")
    }
}

/// Split the last segment of a logical path into file name and extension
///
/// An extension exists whenever the last segment contains a dot, even a
/// trailing one (`page.` has the empty extension).
pub fn split_extension(logical_path: &str) -> (&str, Option<&str>) {
    let segment = logical_path.rsplit('/').next().unwrap_or(logical_path);
    match segment.rfind('.') {
        Some(dot) => (&segment[..dot], Some(&segment[dot + 1..])),
        None => (segment, None),
    }
}

/// Whether the logical path names an explicit file extension
pub fn has_extension(logical_path: &str) -> bool {
    split_extension(logical_path).1.is_some()
}

/// Display title of a logical path
///
/// `getting-started/first-steps.md` becomes `First Steps`.
pub fn title(logical_path: &str) -> String {
    let (file_name, _) = split_extension(logical_path);
    capitalize_words(&file_name.replace('-', " "))
}

/// Upper-case the first letter of every whitespace-separated word
fn capitalize_words(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    result
}
