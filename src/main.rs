//! authgate: inline HTTP authorization gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                           ┌──────────────────────────────────────────────┐
//!                           │                  AUTHGATE                    │
//!   Client Request          │  ┌─────────┐   ┌─────────┐   ┌───────────┐   │
//!   ────────────────────────┼─▶│   net   │──▶│  http   │──▶│  gateway  │   │
//!                           │  │listener │   │ server  │   │ classify  │   │
//!                           │  └─────────┘   └─────────┘   └─────┬─────┘   │
//!                           │                     bypass ┌───────┴───────┐ │
//!                           │                            │   capture +   │ │      Auth
//!                           │                            │ authorization │─┼──▶ service
//!                           │                            └───────┬───────┘ │
//!   Client Response         │  ┌─────────┐   ┌─────────┐  200    │  other  │
//!   ◀───────────────────────┼──│response │◀──│ forward │◀────────┘ (relay) │
//!                           │  └─────────┘   └────┬────┘                   │
//!                           └─────────────────────┼────────────────────────┘
//!                                                 ▼
//!                                              Upstream
//! ```

use std::sync::Arc;

use clap::Parser;

use authgate::config::{ConfigArgs, ProxyConfig};
use authgate::lifecycle::Shutdown;
use authgate::net::Listener;
use authgate::observability::{logging, metrics};
use authgate::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ConfigArgs::parse();
    let config = match ProxyConfig::from_args(&args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("authgate: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);

    tracing::info!(
        listen = %config.listener.bind_address,
        upstream = %config.upstream.url,
        auth_endpoint = %config.auth.endpoint,
        auth_method = %config.auth.method,
        include_regex = %config.auth.include_pattern,
        max_capture_bytes = config.auth.max_capture_bytes,
        forward_headers = ?config.auth.forward_headers,
        debug = config.observability.debug,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr);
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    HttpServer::new(config)?
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
