//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, Axum router)
//!     → request.rs (request ID)
//!     → [gateway decides: bypass, allow, deny]
//!     → forward.rs (authorization and upstream calls)
//!     → response.rs (failures only; relayed responses pass through)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{HyperTransport, Transport};
pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::{BoxError, ProxyError};
pub use server::HttpServer;
