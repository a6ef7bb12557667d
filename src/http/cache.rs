//! HTTP cache control module
//!
//! `ETag` generation and `If-None-Match` evaluation for public assets.
//! Rendered pages are built per request and are never tagged.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate an `ETag` for an asset body using a fast non-cryptographic hash
///
/// Returns the quoted form required by RFC 9110, e.g. `"9f86d081884c"`.
pub fn asset_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Check whether a client `If-None-Match` header revalidates against `etag`
///
/// The header may carry a single tag, a comma separated list, or the `*`
/// wildcard. A match means the asset is unchanged and a `304 Not Modified`
/// should be returned.
pub fn if_none_match_hits(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|candidates| {
        candidates
            .split(',')
            .map(str::trim)
            .any(|candidate| candidate == etag || candidate == "*")
    })
}
