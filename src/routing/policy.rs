//! Path inclusion policy.
//!
//! Decides, per request, whether the authorization pre-flight is required.
//! Immutable after construction, so it is shared without locks.

use axum::http::Method;

use crate::config::AuthConfig;
use crate::routing::matcher::{Matcher, PathPatternMatcher, PreflightMatcher};

#[derive(Debug, Clone)]
pub struct InclusionPolicy {
    include: PathPatternMatcher,
    exempt: PreflightMatcher,
}

impl InclusionPolicy {
    pub fn new(include: PathPatternMatcher) -> Self {
        Self {
            include,
            exempt: PreflightMatcher,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(PathPatternMatcher::new(config.include_pattern.clone()))
    }

    /// Returns false (bypass) for preflight requests and for paths outside
    /// the include pattern.
    pub fn requires_auth(&self, path: &str, method: &Method) -> bool {
        !self.exempt.matches(method, path) && self.include.matches(method, path)
    }
}
