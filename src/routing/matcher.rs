//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match path prefix on segment boundaries (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive
//! - Path matching is case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the Host header.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get("host")
            .and_then(|h| h.to_str().ok())
            .map(|h| h.eq_ignore_ascii_case(&self.expected_host))
            .unwrap_or(false)
    }
}

/// Matches the request path prefix.
///
/// `/services/store` matches `/services/store` and `/services/store/x`
/// but not `/services/storefront`.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    /// Whether `path` starts with this prefix on a segment boundary.
    pub fn matches_path(&self, path: &str) -> bool {
        match path.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.is_empty(),
            None => false,
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, host: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Host", host)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_host_matcher() {
        let matcher = HostMatcher::new("example.com");

        assert!(matcher.matches(&request("/", "example.com")));
        assert!(matcher.matches(&request("/", "EXAMPLE.COM"))); // Case insensitive
        assert!(!matcher.matches(&request("/", "other.com")));
    }

    #[test]
    fn test_path_matcher_segment_boundaries() {
        let matcher = PathPrefixMatcher::new("/services/store/store-1");

        assert!(matcher.matches(&request("/services/store/store-1", "gw")));
        assert!(matcher.matches(&request("/services/store/store-1/v3/api-docs", "gw")));
        assert!(!matcher.matches(&request("/services/store/store-10/v3/api-docs", "gw")));
        assert!(!matcher.matches(&request("/images", "gw")));
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let matcher = PathPrefixMatcher::new("/");
        assert!(matcher.matches_path("/"));
        assert!(matcher.matches_path("/anything/at/all"));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(HostMatcher::new("gw.local")),
            Box::new(PathPrefixMatcher::new("/services")),
        ]);

        assert!(matcher.matches(&request("/services/a/b", "gw.local")));
        assert!(!matcher.matches(&request("/services/a/b", "other")));
        assert!(!matcher.matches(&request("/api", "gw.local")));
    }
}
