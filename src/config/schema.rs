//! Configuration schema definitions.
//!
//! This module defines the resolved, immutable configuration record for the
//! gate. Raw settings arrive as [`ConfigArgs`](crate::config::ConfigArgs)
//! and are turned into a [`ProxyConfig`] exactly once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderName, HeaderValue, Method, Uri};
use regex::Regex;
use url::Url;

pub const DEFAULT_LISTEN_ADDR: &str = ":8082";
pub const DEFAULT_UPSTREAM_ADDR: &str = "http://127.0.0.1:8080";
pub const DEFAULT_AUTH_ENDPOINT: &str = "http://127.0.0.1:8181/v1/signature";
pub const DEFAULT_AUTH_METHOD: &str = "POST";
pub const DEFAULT_AUTH_INCLUDE_REGEX: &str = "^/public(?:/|$)";
pub const DEFAULT_MAX_BODY_SIZE_MB: u64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;
pub const DEFAULT_READ_HEADER_TIMEOUT_SECS: u64 = 5;

/// Root configuration for the authorization gate.
///
/// Built once by [`ProxyConfig::from_args`](crate::config::loader) and shared
/// behind an `Arc`; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Protected upstream every allowed or bypassed request goes to.
    pub upstream: Upstream,

    /// Authorization service settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8082").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// How long a client may take to send complete request headers.
    pub read_header_timeout: Duration,
}

/// Upstream base URL with the pieces a retarget needs pre-parsed.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub url: Url,
    pub scheme: Scheme,
    pub authority: Authority,
    /// `Host` header value sent with every forwarded request.
    pub host: HeaderValue,
}

/// Authorization service configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Absolute URI of the decision endpoint.
    pub endpoint: Uri,

    /// Method used for the authorization call.
    pub method: Method,

    /// Only paths matching this pattern require authorization.
    pub include_pattern: Regex,

    /// Ceiling on the body prefix sent to the authorization service.
    pub max_capture_bytes: usize,

    /// Authorization response headers copied onto the upstream request.
    pub forward_headers: Vec<HeaderName>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Verbose per-leg request/response dumps.
    pub debug: bool,

    /// Log formatter selection.
    pub log_format: LogFormat,

    /// Prometheus endpoint bind address, disabled when absent.
    pub metrics_address: Option<SocketAddr>,
}
