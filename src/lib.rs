//! Inline HTTP authorization gateway library.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::{ConfigArgs, ProxyConfig};
pub use gateway::{AuthGateway, GateState};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
