//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map per-request failures to HTTP status codes for the client
//! - Make every failure visible in logs, independent of the debug flag
//!
//! # Design Decisions
//! - Relayed responses are never rewritten here; only failures are synthesized
//! - Transport failures on either outbound call become 502 Bad Gateway
//! - No partial body from a half-completed call is ever forwarded

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Boxed error returned by outbound transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that end a request cycle without a relayed response.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("authorization call failed: {0}")]
    AuthDelivery(#[source] BoxError),

    #[error("upstream request failed: {0}")]
    UpstreamDelivery(#[source] BoxError),

    #[error("failed to read client request body: {0}")]
    ClientBody(#[source] axum::Error),

    #[error("failed to build outbound request: {0}")]
    BuildRequest(#[from] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AuthDelivery(_) | ProxyError::UpstreamDelivery(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::ClientBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::BuildRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the failure at a level matching who is at fault.
    pub fn log(&self, request_id: &str) {
        match self {
            ProxyError::ClientBody(_) => {
                tracing::warn!(request_id = %request_id, error = %self, "Client request aborted")
            }
            _ => tracing::error!(request_id = %request_id, error = %self, "Request failed"),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match self {
            ProxyError::AuthDelivery(_) => "Authorization service unavailable",
            ProxyError::UpstreamDelivery(_) => "Upstream request failed",
            ProxyError::ClientBody(_) => "Failed to read request body",
            ProxyError::BuildRequest(_) => "Failed to build outbound request",
        };
        (self.status(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_failures_map_to_bad_gateway() {
        let err = ProxyError::AuthDelivery("connection refused".into());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("connection refused"));

        let err = ProxyError::UpstreamDelivery("dns error".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_client_body_maps_to_bad_request() {
        let err = ProxyError::ClientBody(axum::Error::new("reset"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
