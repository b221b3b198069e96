//! Authorization gateway.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pipeline.rs (classify against the inclusion policy)
//!     → capture.rs (bounded body prefix, replayable remainder)
//!     → headers.rs (authorization call: signature headers + X-Orig-*)
//!     → http/forward.rs (authorization service)
//!     → 200: headers.rs (retarget, allowlisted headers) → upstream
//!     → otherwise: headers.rs (denial) → client
//! ```
//!
//! # Design Decisions
//! - The body prefix is read once and shared by both outbound calls
//! - Only an exact `200 OK` from the authorization service allows a request
//! - Every non-200 authorization status is relayed to the client as-is

pub mod capture;
pub mod headers;
pub mod pipeline;

pub use capture::{capture, CapturedBody};
pub use pipeline::{AuthGateway, GateState, Outcome};
