//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → dump.rs (per-leg dumps when DEBUG is set)
//!
//! Consumers:
//!     → stdout (text or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Failures are logged regardless of the debug flag
//! - Dumps only observe; they never read or alter a body stream
//! - Request ID flows through every log line of a request

pub mod dump;
pub mod logging;
pub mod metrics;
