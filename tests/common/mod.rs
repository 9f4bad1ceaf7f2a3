//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::header::{ACCEPT_ENCODING, CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, HeaderName, Method, Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use skip_proxy::transport::{Transport, TransportError};

/// What a fake transport was asked to deliver.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = Box<dyn Fn() -> Response<Body> + Send + Sync>;

/// Transport that answers every request with a canned response and records
/// what it was sent.
pub struct FakeTransport {
    responder: Responder,
    seen: Mutex<Vec<SeenRequest>>,
    shutdowns: AtomicUsize,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn responding<F>(responder: F) -> Arc<Self>
    where
        F: Fn() -> Response<Body> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            seen: Mutex::new(Vec::new()),
            shutdowns: AtomicUsize::new(0),
        })
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        self.seen.lock().unwrap().push(SeenRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        Ok((self.responder)())
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport whose every delivery fails.
#[allow(dead_code)]
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn execute(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        Err(TransportError::Upstream {
            target: request.uri().to_string(),
            source: "connection refused".into(),
        })
    }
}

/// Start a plain-HTTP upstream on an ephemeral port.
///
/// - `/page`: HTML linking to itself over https
/// - `/redirect`: 302 to an https URL on itself
/// - `/echo`: JSON describing the request, including an https self link
#[allow(dead_code)]
pub async fn start_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/page",
            get(move || async move {
                (
                    [(CONTENT_TYPE, "text/html; charset=utf-8")],
                    format!(r#"<html><body><a href="https://{addr}/next">next</a></body></html>"#),
                )
            }),
        )
        .route(
            "/redirect",
            get(move || async move {
                (StatusCode::FOUND, [(LOCATION, format!("https://{addr}/login"))]).into_response()
            }),
        )
        .route(
            "/echo",
            get(move |headers: HeaderMap| async move {
                let header = |name: HeaderName| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                Json(serde_json::json!({
                    "accept_encoding": header(ACCEPT_ENCODING),
                    "host": header(HOST),
                    "self": format!("https://{addr}/echo"),
                }))
            }),
        );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}
