//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging → Metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Stop accepting → In-flight connections finish → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
