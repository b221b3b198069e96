//! HTTP server setup and the connection loop.
//!
//! # Responsibilities
//! - Build the Axum router around the authorization gateway
//! - Wire up middleware (request ID, tracing)
//! - Accept connections from the bounded listener and serve HTTP/1.1 and HTTP/2
//! - Enforce the request-header read timeout
//! - Stop accepting on shutdown

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto,
    service::TowerToHyperService,
};
use tokio::sync::broadcast;
use tower::{service_fn, ServiceExt};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::gateway::{AuthGateway, GateState, Outcome};
use crate::http::forward::{HyperTransport, Transport};
use crate::http::request::{assign_request_id, RequestIdExt};
use crate::net::Listener;
use crate::observability::metrics;

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Server using the pooled hyper client for outbound calls.
    pub fn new(config: Arc<ProxyConfig>) -> Result<Self, rustls::Error> {
        Ok(Self::with_transport(config, HyperTransport::new()?))
    }

    pub fn with_transport<T: Transport>(config: Arc<ProxyConfig>, transport: T) -> Self {
        let gateway = Arc::new(AuthGateway::new(config.clone(), transport));
        let router = Self::build_router(gateway);
        Self { router, config }
    }

    /// Every path and method lands on the gateway.
    fn build_router<T: Transport>(gateway: Arc<AuthGateway<T>>) -> Router {
        Router::new()
            .fallback(proxy_handler::<T>)
            .with_state(gateway)
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let peer = request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| *addr);
                tracing::info_span!(
                    "request",
                    request_id = %request.request_id(),
                    method = %request.method(),
                    uri = %request.uri(),
                    peer = ?peer,
                )
            }))
            .layer(axum::middleware::from_fn(assign_request_id))
    }

    /// Serve connections from `listener` until `shutdown` fires.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            auth_endpoint = %self.config.auth.endpoint,
            "HTTP server starting"
        );

        let mut builder = auto::Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.listener.read_header_timeout);
        let builder = Arc::new(builder);

        loop {
            let (stream, peer, permit) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        continue;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            };

            let router = self.router.clone();
            let builder = builder.clone();

            tokio::spawn(async move {
                let _permit = permit;
                metrics::connection_opened();

                let service = service_fn(move |mut request: Request<Incoming>| {
                    request.extensions_mut().insert(ConnectInfo(peer));
                    router.clone().oneshot(request)
                });

                if let Err(e) = builder
                    .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
                    .await
                {
                    tracing::debug!(peer_addr = %peer, error = %e, "Connection closed with error");
                }

                metrics::connection_closed();
            });
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Run one request through the gateway and turn the outcome into a response.
async fn proxy_handler<T: Transport>(
    State(gateway): State<Arc<AuthGateway<T>>>,
    request: Request<Body>,
) -> Response {
    let request_id = request.request_id().to_string();

    match gateway.handle(request).await {
        Ok(Outcome {
            state,
            mut response,
        }) => {
            metrics::record_outcome(state.as_str());
            if state == GateState::Denied {
                tracing::info!(
                    request_id = %request_id,
                    status = %response.status(),
                    "Request denied by authorization service"
                );
            }
            response.extensions_mut().insert(state);
            response
        }
        Err(err) => {
            metrics::record_outcome("error");
            err.log(&request_id);
            err.into_response()
        }
    }
}
