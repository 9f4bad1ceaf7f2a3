//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Find the host the client asked for (Host header, else URI authority)
//! - Readdress the request to the demunged upstream
//! - Force identity encoding so HTML bodies can be rewritten as text
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The client's original host is kept for the response rewrite, never re-derived

use std::str::FromStr;

use axum::body::Body;
use axum::http::header::{ACCEPT_ENCODING, HOST};
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::addr::Demunged;
use crate::http::headers::strip_hop_by_hop;
use crate::transport::TransportError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request's ID, or "unknown" outside the request-id layer.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The host the client addressed, as sent.
///
/// HTTP/1.1 carries it in `Host`; HTTP/2 in the `:authority` pseudo-header,
/// which lands in the URI.
pub fn inbound_host<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Address resolution and content negotiation guard.
///
/// Demunges the inbound host, points the request at it over `scheme`, and
/// drops `Accept-Encoding` so the upstream answers uncompressed. Returns the
/// readdressed request and the host pair for rewriting the response.
pub fn prepare_upstream(
    request: Request<Body>,
    scheme: &Scheme,
) -> Result<(Request<Body>, Demunged), TransportError> {
    let demunged = Demunged::from_host(&inbound_host(&request));
    let host = demunged.canonical();
    let invalid = |reason: String| TransportError::InvalidTarget {
        target: host.to_string(),
        reason,
    };

    let (mut parts, body) = request.into_parts();

    let authority = Authority::from_str(host).map_err(|e| invalid(e.to_string()))?;
    let mut uri_parts = std::mem::take(&mut parts.uri).into_parts();
    uri_parts.scheme = Some(scheme.clone());
    uri_parts.authority = Some(authority);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = Uri::from_parts(uri_parts).map_err(|e| invalid(e.to_string()))?;

    let host_value = HeaderValue::from_str(host).map_err(|e| invalid(e.to_string()))?;
    parts.headers.insert(HOST, host_value);
    parts.headers.remove(ACCEPT_ENCODING);
    strip_hop_by_hop(&mut parts.headers);

    Ok((Request::from_parts(parts, body), demunged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(host: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(HOST, host)
            .header(ACCEPT_ENCODING, "gzip, br")
            .header("cookie", "session=1")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn readdresses_scion_host() {
        let (req, pair) = prepare_upstream(
            request("1-ff00_0_110-192.0.2.1.scion", "/path?q=1"),
            &Scheme::HTTPS,
        )
        .unwrap();

        assert_eq!(pair.munged(), "1-ff00_0_110-192.0.2.1.scion");
        assert_eq!(req.uri().to_string(), "https://[1-ff00:0:110,192.0.2.1]/path?q=1");
        assert_eq!(req.headers()[HOST], "[1-ff00:0:110,192.0.2.1]");
    }

    #[test]
    fn strips_accept_encoding_and_keeps_end_to_end_headers() {
        let (req, _) = prepare_upstream(request("example.org.scion", "/"), &Scheme::HTTPS).unwrap();

        assert!(req.headers().get(ACCEPT_ENCODING).is_none());
        assert_eq!(req.headers()["cookie"], "session=1");
        assert_eq!(req.uri().to_string(), "https://example.org/");
    }

    #[test]
    fn absolute_form_uri_is_replaced() {
        let (req, _) = prepare_upstream(
            request("example.org.scion", "http://example.org.scion/a/b"),
            &Scheme::HTTP,
        )
        .unwrap();
        assert_eq!(req.uri().to_string(), "http://example.org/a/b");
    }

    #[test]
    fn authority_used_when_host_header_missing() {
        let req = Request::builder()
            .uri("http://1-ff00_0_110-10.0.0.1.scion/")
            .body(Body::empty())
            .unwrap();
        assert_eq!(inbound_host(&req), "1-ff00_0_110-10.0.0.1.scion");
    }

    #[test]
    fn unaddressable_host_is_invalid_target() {
        let err = prepare_upstream(request("bad host", "/"), &Scheme::HTTPS).unwrap_err();
        assert!(matches!(err, TransportError::InvalidTarget { .. }));
    }
}
