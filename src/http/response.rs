//! Response handling and transformation.
//!
//! # Responsibilities
//! - Rewrite upstream header values into the client's address space
//! - Rewrite HTML bodies the same way
//! - Pass every other body through as a stream
//!
//! # Design Decisions
//! - Only `text/html` is buffered; everything else streams untouched
//! - Hop-by-hop headers stripped; the server frames the body itself
//! - Content-Length dropped when the body is rewritten
//! - Bodiless responses (HEAD, 204, 304) keep the upstream's Content-Length

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use thiserror::Error;

use crate::http::headers::strip_hop_by_hop;
use crate::observability::metrics;
use crate::rewrite::HostRewriter;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("failed to read upstream HTML body: {0}")]
    Body(#[source] axum::Error),
}

/// Whether the body is HTML and must be rewritten.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

/// Whether the response can carry no body, whatever its headers say.
pub fn is_bodiless(request_method: &Method, status: StatusCode) -> bool {
    *request_method == Method::HEAD
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Rewrite an upstream response for the client.
///
/// Headers are always rewritten. The body is read in full (up to
/// `max_html_body_bytes`) and rewritten only for HTML, and only when the
/// response to `request_method` has a body at all.
pub async fn rewrite_response(
    response: Response<Body>,
    request_method: &Method,
    rewriter: &HostRewriter,
    max_html_body_bytes: usize,
) -> Result<Response<Body>, RewriteError> {
    let (mut parts, body) = response.into_parts();
    let html = is_html(&parts.headers) && !is_bodiless(request_method, parts.status);

    let mut headers = HeaderMap::with_capacity(parts.headers.len());
    rewriter.rewrite_headers(&parts.headers, &mut headers);
    strip_hop_by_hop(&mut headers);

    let body = if html {
        headers.remove(CONTENT_LENGTH);
        let bytes = axum::body::to_bytes(body, max_html_body_bytes)
            .await
            .map_err(RewriteError::Body)?;
        metrics::record_body_rewrite();
        Body::from(rewriter.rewrite(&bytes).into_owned())
    } else {
        body
    };

    parts.headers = headers;
    Ok(Response::from_parts(parts, body))
}
