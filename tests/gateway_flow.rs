//! End-to-end behaviour of the gate between a real client, auth service and
//! upstream, all on loopback.

mod common;

use common::{gate_args, settle, start_gate, MockServer, Reply};

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn test_excluded_path_bypasses_auth() {
    let upstream = MockServer::start(Reply::new(200, "private data")).await;
    let auth = MockServer::start(Reply::new(403, "")).await;
    let gate = start_gate(gate_args(&upstream, &auth)).await;

    let response = client()
        .get(gate.url("/private/data?page=2"))
        .header("x-custom", "kept")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "private data");
    assert!(auth.requests().is_empty());

    let forwarded = upstream.requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].uri, "/private/data?page=2");
    assert_eq!(forwarded[0].headers["x-custom"], "kept");
    assert_eq!(forwarded[0].headers["host"], upstream.addr.to_string().as_str());
}

#[tokio::test]
async fn test_allowed_request_reaches_upstream_with_body() {
    let upstream = MockServer::start(Reply::new(201, "created").header("x-upstream", "yes")).await;
    let auth = MockServer::start(Reply::new(200, "ok")).await;
    let gate = start_gate(gate_args(&upstream, &auth)).await;

    let response = client()
        .post(gate.url("/public/submit?x=1"))
        .header("signature", "sig=abc")
        .header("signature-date", "2024-01-01")
        .header("authorization", "Bearer t")
        .body("{\"a\":1}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["x-upstream"], "yes");
    assert_eq!(response.text().await.unwrap(), "created");

    let checks = auth.requests();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].method, "POST");
    assert_eq!(checks[0].uri, "/v1/signature");
    assert_eq!(checks[0].body, "{\"a\":1}");
    assert_eq!(checks[0].headers["x-orig-uri"], "/public/submit?x=1");
    assert_eq!(checks[0].headers["x-orig-method"], "POST");
    assert_eq!(checks[0].headers["signature"], "sig=abc");
    assert_eq!(checks[0].headers["signature-date"], "2024-01-01");
    assert!(!checks[0].headers.contains_key("authorization"));

    let forwarded = upstream.requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].method, "POST");
    assert_eq!(forwarded[0].uri, "/public/submit?x=1");
    assert_eq!(forwarded[0].body, "{\"a\":1}");
    assert_eq!(forwarded[0].headers["authorization"], "Bearer t");
}

#[tokio::test]
async fn test_denied_request_relays_auth_response() {
    let upstream = MockServer::start(Reply::new(200, "should not be seen")).await;
    let auth = MockServer::start(Reply::new(403, "denied by policy").header("x-reason", "blocked")).await;
    let gate = start_gate(gate_args(&upstream, &auth)).await;

    let response = client().get(gate.url("/public/data")).send().await.unwrap();

    assert_eq!(response.status(), 403);
    assert_eq!(response.headers()["x-reason"], "blocked");
    assert_eq!(response.text().await.unwrap(), "");
    assert_eq!(auth.requests().len(), 1);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_allowlisted_auth_headers_override_client_headers() {
    let upstream = MockServer::start(Reply::new(200, "ok")).await;
    let auth = MockServer::start(
        Reply::new(200, "")
            .header("client", "alice")
            .header("x-internal", "secret"),
    )
    .await;
    let mut args = gate_args(&upstream, &auth);
    args.auth_forward_auth_headers = "Client, Service".to_string();
    let gate = start_gate(args).await;

    let response = client()
        .get(gate.url("/public/data"))
        .header("client", "mallory")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let forwarded = &upstream.requests()[0];
    let clients: Vec<_> = forwarded.headers.get_all("client").iter().collect();
    assert_eq!(clients, vec!["alice"]);
    assert!(!forwarded.headers.contains_key("service"));
    assert!(!forwarded.headers.contains_key("x-internal"));
}

#[tokio::test]
async fn test_zero_capture_limit_sends_empty_auth_body() {
    let upstream = MockServer::start(Reply::new(200, "ok")).await;
    let auth = MockServer::start(Reply::new(200, "")).await;
    let mut args = gate_args(&upstream, &auth);
    args.max_body_size_mb = 0;
    let gate = start_gate(args).await;

    let payload = "x".repeat(64 * 1024);
    let response = client()
        .put(gate.url("/public/blob"))
        .body(payload.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(auth.requests()[0].body.is_empty());
    assert_eq!(upstream.requests()[0].body, payload.as_bytes());
}

#[tokio::test]
async fn test_preflight_skips_auth() {
    let upstream = MockServer::start(Reply::new(204, "")).await;
    let auth = MockServer::start(Reply::new(403, "")).await;
    let gate = start_gate(gate_args(&upstream, &auth)).await;

    let response = client()
        .request(reqwest::Method::OPTIONS, gate.url("/public/data"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    assert!(auth.requests().is_empty());
    assert_eq!(upstream.requests().len(), 1);
}

#[tokio::test]
async fn test_unreachable_auth_service_is_bad_gateway() {
    let upstream = MockServer::start(Reply::new(200, "ok")).await;
    let auth = MockServer::start(Reply::new(200, "")).await;
    let mut args = gate_args(&upstream, &auth);

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    args.auth_endpoint = format!("http://{}/v1/signature", closed.local_addr().unwrap());
    drop(closed);
    let gate = start_gate(args).await;

    let response = client().get(gate.url("/public/data")).send().await.unwrap();

    assert_eq!(response.status(), 502);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let upstream = MockServer::start(Reply::new(200, "ok")).await;
    let auth = MockServer::start(Reply::new(200, "")).await;
    let gate = start_gate(gate_args(&upstream, &auth)).await;

    gate.shutdown.trigger();
    settle().await;

    let result = tokio::net::TcpStream::connect(gate.addr).await;
    assert!(result.is_err());
}
