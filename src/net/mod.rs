//! Network layer.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, connection limit)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded concurrency prevents resource exhaustion
//! - Permits are held per connection and released on drop

pub mod listener;

pub use listener::{ConnectionPermit, Listener, ListenerError};
