//! Configuration loading from the command line and environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::schema::*;
use crate::config::validation::{
    compile_pattern, mebibytes_to_bytes, normalize_listen_address, parse_endpoint, parse_flag,
    parse_header_list, parse_method, parse_upstream,
};

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {setting} {value:?}: {reason}")]
    InvalidUrl {
        setting: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid AUTH_INCLUDE_REGEX {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid AUTH_METHOD {value:?}")]
    InvalidMethod { value: String },

    #[error("invalid header name {name:?} in AUTH_FORWARD_AUTH_HEADERS")]
    InvalidHeaderName { name: String },

    #[error("invalid LISTEN_ADDR {value:?}: expected host:port or :port")]
    InvalidListenAddress { value: String },
}

/// Raw settings, each settable by flag or environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "authgate")]
#[command(about = "Reverse proxy that authorizes requests against a decision service before forwarding", long_about = None)]
pub struct ConfigArgs {
    /// Address to listen on (`:port` binds all interfaces).
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Base URL of the protected upstream.
    #[arg(long, env = "UPSTREAM_ADDR", default_value = DEFAULT_UPSTREAM_ADDR)]
    pub upstream_addr: String,

    /// Authorization service endpoint.
    #[arg(long, env = "AUTH_ENDPOINT", default_value = DEFAULT_AUTH_ENDPOINT)]
    pub auth_endpoint: String,

    /// HTTP method of the authorization call.
    #[arg(long, env = "AUTH_METHOD", default_value = DEFAULT_AUTH_METHOD)]
    pub auth_method: String,

    /// Only request paths matching this regex are authorized.
    #[arg(long, env = "AUTH_INCLUDE_REGEX", default_value = DEFAULT_AUTH_INCLUDE_REGEX)]
    pub auth_include_regex: String,

    /// Body prefix sent to the authorization service, in MiB.
    #[arg(long, env = "MAX_BODY_SIZE_MB", default_value_t = DEFAULT_MAX_BODY_SIZE_MB)]
    pub max_body_size_mb: u64,

    /// Comma-separated authorization response headers to copy upstream.
    #[arg(long, env = "AUTH_FORWARD_AUTH_HEADERS", default_value = "")]
    pub auth_forward_auth_headers: String,

    /// Verbose per-leg dumps (1/true/yes).
    #[arg(long, env = "DEBUG", default_value = "false", action = clap::ArgAction::Set, value_parser = parse_flag)]
    pub debug: bool,

    /// Maximum concurrent client connections.
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// Seconds a client may take to send its request headers.
    #[arg(long, env = "READ_HEADER_TIMEOUT_SECS", default_value_t = DEFAULT_READ_HEADER_TIMEOUT_SECS)]
    pub read_header_timeout_secs: u64,

    /// Prometheus metrics listener; metrics are off when unset.
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Default for ConfigArgs {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            upstream_addr: DEFAULT_UPSTREAM_ADDR.to_string(),
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            auth_method: DEFAULT_AUTH_METHOD.to_string(),
            auth_include_regex: DEFAULT_AUTH_INCLUDE_REGEX.to_string(),
            max_body_size_mb: DEFAULT_MAX_BODY_SIZE_MB,
            auth_forward_auth_headers: String::new(),
            debug: false,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            read_header_timeout_secs: DEFAULT_READ_HEADER_TIMEOUT_SECS,
            metrics_addr: None,
            log_format: LogFormat::Text,
        }
    }
}

impl ProxyConfig {
    /// Validate raw settings and freeze them into the runtime record.
    pub fn from_args(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let upstream = parse_upstream(&args.upstream_addr)?;
        let include_pattern = compile_pattern(&args.auth_include_regex)?;

        let auth = AuthConfig {
            endpoint: parse_endpoint(&args.auth_endpoint)?,
            method: parse_method(&args.auth_method)?,
            include_pattern,
            max_capture_bytes: mebibytes_to_bytes(args.max_body_size_mb),
            forward_headers: parse_header_list(&args.auth_forward_auth_headers)?,
        };

        Ok(Self {
            listener: ListenerConfig {
                bind_address: normalize_listen_address(&args.listen_addr)?,
                max_connections: args.max_connections.max(1),
                read_header_timeout: Duration::from_secs(args.read_header_timeout_secs),
            },
            upstream,
            auth,
            observability: ObservabilityConfig {
                debug: args.debug,
                log_format: args.log_format,
                metrics_address: args.metrics_addr,
            },
        })
    }
}
