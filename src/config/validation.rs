//! Configuration validation.
//!
//! # Responsibilities
//! - Turn raw setting strings into typed, checked values
//! - Reject anything that cannot work at request time (bad URLs, bad regex)
//!
//! # Design Decisions
//! - Every function here is pure: raw input in, typed value or error out
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderName, HeaderValue, Method, Uri};
use regex::Regex;
use url::{Position, Url};

use crate::config::loader::ConfigError;
use crate::config::schema::Upstream;

/// Interpret a boolean environment value.
///
/// `1`, `true` and `yes` (any case) are truthy; everything else is false.
pub fn parse_flag(raw: &str) -> Result<bool, std::convert::Infallible> {
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    ))
}

/// Parse a comma-separated header list into canonical header names.
///
/// Order of first appearance is kept; blanks and case-insensitive
/// duplicates are dropped.
pub fn parse_header_list(raw: &str) -> Result<Vec<HeaderName>, ConfigError> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let name = HeaderName::from_bytes(item.as_bytes()).map_err(|_| {
            ConfigError::InvalidHeaderName {
                name: item.to_string(),
            }
        })?;
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    Ok(names)
}

/// Expand the `:port` shorthand into a bindable address.
pub fn normalize_listen_address(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    let addr = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => raw.to_string(),
    };

    let port_ok = addr
        .rsplit_once(':')
        .map(|(_, port)| port.parse::<u16>().is_ok())
        .unwrap_or(false);
    if !port_ok {
        return Err(ConfigError::InvalidListenAddress {
            value: raw.to_string(),
        });
    }

    Ok(addr)
}

/// Parse and check an absolute `http`/`https` URL.
fn parse_http_url(setting: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        setting,
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{}`", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}

/// Resolve the upstream base URL into scheme, authority and `Host` value.
pub fn parse_upstream(raw: &str) -> Result<Upstream, ConfigError> {
    let url = parse_http_url("UPSTREAM_ADDR", raw)?;
    let invalid = |reason: String| ConfigError::InvalidUrl {
        setting: "UPSTREAM_ADDR",
        value: raw.to_string(),
        reason,
    };

    let scheme = if url.scheme() == "https" {
        Scheme::HTTPS
    } else {
        Scheme::HTTP
    };
    let host_port = &url[Position::BeforeHost..Position::AfterPort];
    let authority = Authority::try_from(host_port).map_err(|e| invalid(e.to_string()))?;
    let host = HeaderValue::from_str(host_port).map_err(|e| invalid(e.to_string()))?;

    Ok(Upstream {
        url,
        scheme,
        authority,
        host,
    })
}

/// Resolve the authorization endpoint into a request URI.
pub fn parse_endpoint(raw: &str) -> Result<Uri, ConfigError> {
    let url = parse_http_url("AUTH_ENDPOINT", raw)?;
    Uri::try_from(url.as_str()).map_err(|e| ConfigError::InvalidUrl {
        setting: "AUTH_ENDPOINT",
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    Method::from_bytes(raw.trim().as_bytes()).map_err(|_| ConfigError::InvalidMethod {
        value: raw.to_string(),
    })
}

pub fn compile_pattern(raw: &str) -> Result<Regex, ConfigError> {
    Regex::new(raw).map_err(|source| ConfigError::InvalidPattern {
        pattern: raw.to_string(),
        source,
    })
}

/// Convert a whole-mebibyte ceiling into bytes.
pub fn mebibytes_to_bytes(mb: u64) -> usize {
    usize::try_from(mb.saturating_mul(1 << 20)).unwrap_or(usize::MAX)
}
