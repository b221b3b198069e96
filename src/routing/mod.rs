//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → policy.rs (inclusion decision)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: authorize or bypass
//!
//! Policy Compilation (at startup):
//!     AUTH_INCLUDE_REGEX
//!     → compile regex
//!     → Freeze as immutable InclusionPolicy
//! ```
//!
//! # Design Decisions
//! - Policy compiled at startup, immutable at runtime
//! - Deterministic: same method and path always give the same decision

pub mod matcher;
pub mod policy;

pub use policy::InclusionPolicy;
