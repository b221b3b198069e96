//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / environment variables
//!     → loader.rs (clap parsing into ConfigArgs)
//!     → validation.rs (URLs, regex, method, header list)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the gateway and server
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never mutated
//! - Any invalid setting is fatal; there is no partial-startup mode
//! - Every setting has a default so the gate runs with an empty environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigArgs, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, Upstream,
};
