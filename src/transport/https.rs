//! HTTP(S) transport over the regular internet.
//!
//! Reaches plain hostnames (the pass-through side of the codec). Bracketed
//! SCION addresses need a SCION-capable transport injected in its place.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use url::Url;

use crate::addr::ScionAddr;
use crate::config::TransportConfig;
use crate::transport::{Transport, TransportError};

/// Reqwest-backed transport with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    client: reqwest::Client,
    max_request_body_bytes: usize,
}

impl HttpsTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            // Redirects go back to the browser, rewritten.
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            max_request_body_bytes: config.max_request_body_bytes,
        })
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = request.into_parts();
        let target = parts.uri.to_string();

        if let Some(authority) = parts.uri.authority() {
            if authority.host().parse::<ScionAddr>().is_ok() {
                return Err(TransportError::UnsupportedTarget {
                    target: authority.to_string(),
                });
            }
        }

        let url = Url::parse(&target).map_err(|e| TransportError::InvalidTarget {
            target: target.clone(),
            reason: e.to_string(),
        })?;

        let body = axum::body::to_bytes(body, self.max_request_body_bytes)
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        let mut outbound = self
            .client
            .request(parts.method, url)
            .headers(parts.headers);
        if !body.is_empty() {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await.map_err(|e| TransportError::Upstream {
            target: target.clone(),
            source: Box::new(e),
        })?;

        tracing::debug!(
            target = %target,
            status = %upstream.status(),
            "Upstream responded"
        );

        let status = upstream.status();
        let headers = upstream.headers().clone();
        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    async fn shutdown(&self) {
        tracing::debug!("HTTPS transport closed");
    }
}
