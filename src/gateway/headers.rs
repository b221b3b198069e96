//! Header manipulation for the authorization pipeline.
//!
//! # Responsibilities
//! - Select the signature headers that travel to the authorization service
//! - Add the original-request context headers (`X-Orig-Uri`, `X-Orig-Method`)
//! - Retarget a request at the upstream (URI and `Host`)
//! - Copy allowlisted authorization response headers onto the upstream request
//! - Build the denial response relayed to the client
//!
//! # Design Decisions
//! - Allowlisted headers replace, never append
//! - Headers outside the allowlist never reach the upstream request

use axum::body::{Body, Bytes};
use axum::http::uri::PathAndQuery;
use axum::http::{
    header, request, response, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri,
    Version,
};

use crate::config::{AuthConfig, Upstream};

pub const SIGNATURE: HeaderName = HeaderName::from_static("signature");
pub const SIGNATURE_DATE: HeaderName = HeaderName::from_static("signature-date");
pub const X_ORIG_URI: HeaderName = HeaderName::from_static("x-orig-uri");
pub const X_ORIG_METHOD: HeaderName = HeaderName::from_static("x-orig-method");

/// Copy only the signature-bearing headers of the original request.
pub fn signature_subset(headers: &HeaderMap) -> HeaderMap {
    let mut subset = HeaderMap::new();
    for name in [SIGNATURE, SIGNATURE_DATE] {
        for value in headers.get_all(&name) {
            subset.append(name.clone(), value.clone());
        }
    }
    subset
}

/// Path and query of the original request, as the client sent them.
pub fn original_target(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/")
}

/// Build the authorization call for an inbound request.
pub fn authorization_request(
    parts: &request::Parts,
    auth: &AuthConfig,
    body: Bytes,
) -> Result<Request<Body>, axum::http::Error> {
    let mut headers = signature_subset(&parts.headers);
    headers.insert(X_ORIG_URI, HeaderValue::from_str(original_target(&parts.uri))?);
    headers.insert(X_ORIG_METHOD, HeaderValue::from_str(parts.method.as_str())?);

    let mut request = Request::builder()
        .method(auth.method.clone())
        .uri(auth.endpoint.clone())
        .version(Version::HTTP_11)
        .body(Body::from(body))?;
    *request.headers_mut() = headers;

    Ok(request)
}

/// Point a request at the upstream: scheme, authority and `Host` rewritten,
/// everything else untouched.
pub fn retarget(mut request: Request<Body>, upstream: &Upstream) -> Result<Request<Body>, axum::http::Error> {
    let mut uri = request.uri().clone().into_parts();
    uri.scheme = Some(upstream.scheme.clone());
    uri.authority = Some(upstream.authority.clone());
    if uri.path_and_query.is_none() {
        uri.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    *request.uri_mut() = Uri::from_parts(uri)?;
    *request.version_mut() = Version::HTTP_11;
    request
        .headers_mut()
        .insert(header::HOST, upstream.host.clone());

    Ok(request)
}

/// Overwrite allowlisted headers on `target` with the authorization
/// response's non-empty values. Returns the names that were copied.
pub fn forward_allowlisted(
    auth_headers: &HeaderMap,
    target: &mut HeaderMap,
    allowlist: &[HeaderName],
) -> Vec<HeaderName> {
    let mut copied = Vec::new();

    for name in allowlist {
        let values: Vec<HeaderValue> = auth_headers
            .get_all(name)
            .iter()
            .filter(|value| !value.is_empty())
            .cloned()
            .collect();
        if values.is_empty() {
            continue;
        }

        target.remove(name);
        for value in values {
            target.append(name.clone(), value);
        }
        copied.push(name.clone());
    }

    copied
}

/// Relay a denial: the authorization status and headers with an empty body.
///
/// Body framing headers describe the discarded body, so they are dropped.
pub fn denial(auth: response::Parts) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = auth.status;
    *response.headers_mut() = auth.headers;
    response.headers_mut().remove(header::CONTENT_LENGTH);
    response.headers_mut().remove(header::TRANSFER_ENCODING);

    if let Some(reason) = auth.extensions.get::<hyper::ext::ReasonPhrase>() {
        response.extensions_mut().insert(reason.clone());
    }

    response
}
