//! Request matching logic.
//!
//! # Responsibilities
//! - Match the request path against the configured include pattern
//! - Recognize CORS preflight requests
//!
//! # Design Decisions
//! - Path matching sees the path only (no query string, no host)
//! - Patterns are compiled once at startup, never per request

use axum::http::Method;
use regex::Regex;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches the request path against a regular expression.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: Regex,
}

impl PathPatternMatcher {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Matches `OPTIONS` preflight requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightMatcher;

impl Matcher for PreflightMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        method == Method::OPTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_pattern_matcher() {
        let matcher = PathPatternMatcher::new(Regex::new("^/public(?:/|$)").unwrap());

        assert!(matcher.matches(&Method::GET, "/public"));
        assert!(matcher.matches(&Method::GET, "/public/"));
        assert!(matcher.matches(&Method::POST, "/public/submit"));
        assert!(!matcher.matches(&Method::GET, "/publicity"));
        assert!(!matcher.matches(&Method::GET, "/private/data"));
        assert!(!matcher.matches(&Method::GET, "/api/public"));
    }

    #[test]
    fn test_path_pattern_character_classes() {
        let matcher = PathPatternMatcher::new(Regex::new(r"^/v[0-9]+/(orders|users)\b").unwrap());

        assert!(matcher.matches(&Method::GET, "/v1/orders"));
        assert!(matcher.matches(&Method::GET, "/v12/users/7"));
        assert!(!matcher.matches(&Method::GET, "/vx/orders"));
    }

    #[test]
    fn test_preflight_matcher() {
        assert!(PreflightMatcher.matches(&Method::OPTIONS, "/public"));
        assert!(!PreflightMatcher.matches(&Method::GET, "/public"));
    }
}
