//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! http handler (request already addressed to the canonical host)
//!     → Transport::execute
//!     → response (status, headers, streaming body) or TransportError
//!
//! Process shutdown:
//!     HttpServer::run returns → Transport::shutdown
//! ```
//!
//! # Design Decisions
//! - The transport is injected into the server, never a global, so tests can
//!   substitute a fake one
//! - One operation per request, no retries; connection reuse is the
//!   transport's own business
//! - Implementations must tolerate concurrent calls (`Send + Sync`)

pub mod https;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use thiserror::Error;

pub use https::HttpsTransport;

/// Errors delivering a request upstream.
///
/// The display text is what the client sees in the 503 body.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid upstream target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("no route to {target}: this transport cannot reach SCION addresses")]
    UnsupportedTarget { target: String },

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("upstream request to {target} failed: {source}")]
    Upstream {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("transport setup failed: {0}")]
    Setup(String),
}

/// Delivers requests to their real endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one fully formed request and returns the upstream response.
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;

    /// Releases transport resources. Called once, after the server stops.
    async fn shutdown(&self) {}
}
