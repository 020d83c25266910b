//! HTTP cache control module
//!
//! Provides `ETag` generation, conditional request handling and the
//! `Cache-Control` policies used for the Mini-App bundle.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Generate `ETag` using fast hashing
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list and the `*` wildcard.
/// Returns true if matched (should return 304).
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Content-hashed build output, never changes under the same name
    Immutable,
    /// Cache but revalidate every time
    Revalidate,
    /// Never stored by browsers or intermediaries
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::Immutable => "public, max-age=31536000, immutable".to_string(),
            Self::Revalidate => "no-cache".to_string(),
            Self::NoStore => "no-store, no-cache, must-revalidate, max-age=0".to_string(),
        }
    }

    /// Policy for a file served by the static mount.
    ///
    /// HTML may be re-patched on restart so it always revalidates; bundler
    /// output under `assets/` is content-hashed.
    pub fn for_static_file(relative_path: &Path) -> Self {
        let is_html = relative_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
        if is_html {
            return Self::Revalidate;
        }
        if relative_path.starts_with("assets") {
            return Self::Immutable;
        }
        Self::default()
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600) // 1 hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_consistency() {
        let etag1 = generate_etag(b"same content");
        let etag2 = generate_etag(b"same content");
        assert_eq!(etag1, etag2);
        assert!(etag1.starts_with('"') && etag1.ends_with('"'));
        assert_ne!(etag1, generate_etag(b"other content"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_policy_values() {
        assert_eq!(
            CachePolicy::Public(600).to_header_value(),
            "public, max-age=600"
        );
        assert_eq!(
            CachePolicy::NoStore.to_header_value(),
            "no-store, no-cache, must-revalidate, max-age=0"
        );
        assert_eq!(CachePolicy::Revalidate.to_header_value(), "no-cache");
    }

    #[test]
    fn test_static_file_policy() {
        assert_eq!(
            CachePolicy::for_static_file(Path::new("index.html")),
            CachePolicy::Revalidate
        );
        assert_eq!(
            CachePolicy::for_static_file(Path::new("assets/index-3f2a9c.js")),
            CachePolicy::Immutable
        );
        assert_eq!(
            CachePolicy::for_static_file(Path::new("logo.svg")),
            CachePolicy::Public(3600)
        );
    }
}
