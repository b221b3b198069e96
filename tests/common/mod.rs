//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use authgate::config::{ConfigArgs, ProxyConfig};
use authgate::{HttpServer, Listener, Shutdown};
use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, Method, Response, StatusCode};
use axum::Router;
use tokio::net::TcpListener;

/// A request as received by a mock server.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Canned reply of a mock server.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static str,
}

impl Reply {
    pub fn new(status: u16, body: &'static str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// A loopback HTTP server that records every request and answers with a
/// fixed reply.
#[derive(Clone)]
pub struct MockServer {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let log = recorded.clone();
        let app = Router::new().fallback(move |request: Request| {
            let log = log.clone();
            let reply = reply.clone();
            async move {
                let (parts, body) = request.into_parts();
                let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
                log.lock().unwrap().push(Recorded {
                    method: parts.method,
                    uri: parts.uri.to_string(),
                    headers: parts.headers,
                    body,
                });

                let mut response = Response::builder().status(reply.status);
                for (name, value) in &reply.headers {
                    response = response.header(*name, *value);
                }
                response.body(Body::from(reply.body)).unwrap()
            }
        });

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

/// A running gate on loopback.
pub struct Gate {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl Gate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Settings for a gate between the given mock upstream and auth service.
pub fn gate_args(upstream: &MockServer, auth: &MockServer) -> ConfigArgs {
    ConfigArgs {
        listen_addr: "127.0.0.1:0".to_string(),
        upstream_addr: upstream.url(),
        auth_endpoint: format!("{}/v1/signature", auth.url()),
        ..ConfigArgs::default()
    }
}

pub async fn start_gate(args: ConfigArgs) -> Gate {
    let config = Arc::new(ProxyConfig::from_args(&args).unwrap());
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        HttpServer::new(config)
            .unwrap()
            .run(listener, receiver)
            .await
            .unwrap();
    });

    Gate { addr, shutdown }
}

/// Short pause for spawned servers to observe a state change.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
