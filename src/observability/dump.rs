//! Verbose per-leg request/response dumps, gated by the debug flag.
//!
//! Observes already-materialized header maps and byte buffers only; nothing
//! here touches a body stream.

use std::fmt;

use axum::http::{HeaderMap, Method, StatusCode};

/// Longest body prefix rendered in a dump.
pub const BODY_PREVIEW_LIMIT: usize = 2048;

const RULE: &str = "------------------------------------------------------------";

/// Where in the pipeline a dump is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    ClientToProxy,
    ProxyToAuth,
    AuthToProxy,
    ProxyToUpstream,
    BypassToUpstream,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Checkpoint::ClientToProxy => "CLIENT → PROXY",
            Checkpoint::ProxyToAuth => "PROXY → AUTH",
            Checkpoint::AuthToProxy => "AUTH → PROXY",
            Checkpoint::ProxyToUpstream => "PROXY → UPSTREAM",
            Checkpoint::BypassToUpstream => "BYPASS → UPSTREAM",
        })
    }
}

/// Request side of a dump.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub method: &'a Method,
    pub target: &'a str,
    pub headers: &'a HeaderMap,
    pub body: Option<&'a [u8]>,
}

/// Response side of a dump, for checkpoints that have one.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
}

/// Render a dump into log lines.
pub fn render(
    checkpoint: Checkpoint,
    request: RequestView<'_>,
    response: Option<ResponseView<'_>>,
) -> Vec<String> {
    let mut lines = vec![
        RULE.to_string(),
        format!("[{}] {} {}", checkpoint, request.method, request.target),
    ];

    header_lines(&mut lines, '>', request.headers);

    if let Some(body) = request.body.filter(|b| !b.is_empty()) {
        lines.push(format!(
            "  > body ({} bytes): \"{}\"",
            body.len(),
            preview(body)
        ));
    }

    if let Some(response) = response {
        lines.push(format!("  < {}", response.status));
        header_lines(&mut lines, '<', response.headers);
    }

    lines
}

/// Emit a dump through the logger.
pub fn dump(checkpoint: Checkpoint, request: RequestView<'_>, response: Option<ResponseView<'_>>) {
    for line in render(checkpoint, request, response) {
        tracing::info!(target: "authgate::dump", "{}", line);
    }
}

fn header_lines(lines: &mut Vec<String>, direction: char, headers: &HeaderMap) {
    for name in headers.keys() {
        let values: Vec<_> = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect();
        lines.push(format!("  {} {}: {}", direction, name, values.join(", ")));
    }
}

/// Single-line, bounded rendering of a body prefix.
fn preview(body: &[u8]) -> String {
    let shown = &body[..body.len().min(BODY_PREVIEW_LIMIT)];
    let mut text = String::from_utf8_lossy(shown).replace('\n', "\\n");
    if body.len() > BODY_PREVIEW_LIMIT {
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_render_request_only() {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));

        let lines = render(
            Checkpoint::ClientToProxy,
            RequestView {
                method: &Method::GET,
                target: "/public/a?b=1",
                headers: &headers,
                body: None,
            },
            None,
        );

        assert_eq!(lines[1], "[CLIENT → PROXY] GET /public/a?b=1");
        assert_eq!(lines[2], "  > accept: text/html, application/json");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_body_preview_escapes_newlines() {
        let headers = HeaderMap::new();
        let lines = render(
            Checkpoint::ProxyToAuth,
            RequestView {
                method: &Method::POST,
                target: "/v1/signature",
                headers: &headers,
                body: Some(b"line one\nline two"),
            },
            None,
        );

        assert_eq!(lines.last().unwrap(), "  > body (17 bytes): \"line one\\nline two\"");
    }

    #[test]
    fn test_render_bounds_preview() {
        let body = vec![b'x'; BODY_PREVIEW_LIMIT + 10];
        let text = preview(&body);

        assert_eq!(text.len(), BODY_PREVIEW_LIMIT + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_render_with_response() {
        let request_headers = HeaderMap::new();
        let mut response_headers = HeaderMap::new();
        response_headers.insert("x-reason", HeaderValue::from_static("blocked"));
        response_headers.insert("x-raw", HeaderValue::from_bytes(b"caf\xe9").unwrap());

        let lines = render(
            Checkpoint::AuthToProxy,
            RequestView {
                method: &Method::POST,
                target: "/v1/signature",
                headers: &request_headers,
                body: None,
            },
            Some(ResponseView {
                status: StatusCode::FORBIDDEN,
                headers: &response_headers,
            }),
        );

        assert!(lines.contains(&"  < 403 Forbidden".to_string()));
        assert!(lines.contains(&"  < x-reason: blocked".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("  < x-raw: caf")));
    }
}
