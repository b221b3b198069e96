//! The per-request authorization pipeline.
//!
//! ```text
//!            ┌──────────── bypass ─────────────▶ BYPASS ──▶ upstream
//! request ──▶│
//!            └── included ─▶ AUTHORIZING ─┬─ 200 ──▶ ALLOWED ──▶ upstream
//!                                          └─ other ▶ DENIED (auth status + headers)
//! ```
//!
//! Exactly one terminal state per request; no retries, no re-entry.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};

use crate::config::ProxyConfig;
use crate::gateway::capture::{capture, drain, DRAIN_LIMIT};
use crate::gateway::headers;
use crate::http::forward::Transport;
use crate::http::response::ProxyError;
use crate::observability::dump::{dump, Checkpoint, RequestView, ResponseView};
use crate::observability::metrics;
use crate::routing::InclusionPolicy;

/// Pipeline state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateState {
    /// Exempt from authorization, forwarded directly.
    Bypass,
    /// Waiting on the authorization service.
    Authorizing,
    /// Authorized and forwarded upstream.
    Allowed,
    /// Refused; the authorization response was relayed instead.
    Denied,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Bypass => "bypass",
            GateState::Authorizing => "authorizing",
            GateState::Allowed => "allowed",
            GateState::Denied => "denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Authorizing)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a request together with the response for the client.
#[derive(Debug)]
pub struct Outcome {
    pub state: GateState,
    pub response: Response<Body>,
}

/// Classifies, authorizes and forwards inbound requests.
pub struct AuthGateway<T> {
    config: Arc<ProxyConfig>,
    policy: InclusionPolicy,
    transport: T,
}

impl<T: Transport> AuthGateway<T> {
    pub fn new(config: Arc<ProxyConfig>, transport: T) -> Self {
        let policy = InclusionPolicy::from_config(&config.auth);
        Self {
            config,
            policy,
            transport,
        }
    }

    /// First transition: `Bypass` or `Authorizing`.
    pub fn classify<B>(&self, request: &Request<B>) -> GateState {
        if self.policy.requires_auth(request.uri().path(), request.method()) {
            GateState::Authorizing
        } else {
            GateState::Bypass
        }
    }

    /// Run one request through the pipeline.
    pub async fn handle(&self, request: Request<Body>) -> Result<Outcome, ProxyError> {
        match self.classify(&request) {
            GateState::Authorizing => self.authorize(request).await,
            _ => self.bypass(request).await,
        }
    }

    async fn bypass(&self, request: Request<Body>) -> Result<Outcome, ProxyError> {
        let request = headers::retarget(request, &self.config.upstream)?;
        self.dump_request(Checkpoint::BypassToUpstream, &request, None);

        let response = self
            .transport
            .deliver(request)
            .await
            .map_err(ProxyError::UpstreamDelivery)?;

        Ok(Outcome {
            state: GateState::Bypass,
            response,
        })
    }

    async fn authorize(&self, request: Request<Body>) -> Result<Outcome, ProxyError> {
        let auth = &self.config.auth;
        self.dump_request(Checkpoint::ClientToProxy, &request, None);

        let (parts, body) = request.into_parts();
        let captured = capture(body, auth.max_capture_bytes)
            .await
            .map_err(ProxyError::ClientBody)?;

        let auth_request = headers::authorization_request(&parts, auth, captured.prefix.clone())?;
        self.dump_request(Checkpoint::ProxyToAuth, &auth_request, Some(&captured.prefix));
        let sent_headers = self
            .config
            .observability
            .debug
            .then(|| auth_request.headers().clone());

        let started = Instant::now();
        let auth_response = self
            .transport
            .deliver(auth_request)
            .await
            .map_err(ProxyError::AuthDelivery)?;
        metrics::record_auth_latency(started);

        let (auth_parts, auth_body) = auth_response.into_parts();
        if let Some(sent_headers) = &sent_headers {
            dump(
                Checkpoint::AuthToProxy,
                RequestView {
                    method: &auth.method,
                    target: headers::original_target(&auth.endpoint),
                    headers: sent_headers,
                    body: None,
                },
                Some(ResponseView {
                    status: auth_parts.status,
                    headers: &auth_parts.headers,
                }),
            );
        }
        drain(auth_body, DRAIN_LIMIT).await;

        if auth_parts.status != StatusCode::OK {
            tracing::debug!(status = %auth_parts.status, "Authorization refused");
            return Ok(Outcome {
                state: GateState::Denied,
                response: headers::denial(auth_parts),
            });
        }

        let mut request = headers::retarget(Request::from_parts(parts, captured.body), &self.config.upstream)?;

        if !auth.forward_headers.is_empty() {
            let copied =
                headers::forward_allowlisted(&auth_parts.headers, request.headers_mut(), &auth.forward_headers);
            if self.config.observability.debug {
                tracing::info!(
                    target: "authgate::dump",
                    allowlist = ?auth.forward_headers,
                    copied = ?copied,
                    "[FORWARD] copied headers from AUTH → UPSTREAM"
                );
            }
        }

        self.dump_request(Checkpoint::ProxyToUpstream, &request, None);

        let response = self
            .transport
            .deliver(request)
            .await
            .map_err(ProxyError::UpstreamDelivery)?;

        Ok(Outcome {
            state: GateState::Allowed,
            response,
        })
    }

    fn dump_request(&self, checkpoint: Checkpoint, request: &Request<Body>, body: Option<&[u8]>) {
        if !self.config.observability.debug {
            return;
        }
        dump(
            checkpoint,
            RequestView {
                method: request.method(),
                target: headers::original_target(request.uri()),
                headers: request.headers(),
                body,
            },
            None,
        );
    }
}
