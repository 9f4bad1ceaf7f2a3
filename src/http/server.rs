//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Run the four proxy stages for every request
//! - Shut down the server, then the transport
//!
//! # Request Stages
//! ```text
//! 1. address resolution   Host → demunge → upstream URI + Host header
//! 2. negotiation guard    drop Accept-Encoding
//! 3. delegation           Transport::execute (error → 503, nothing rewritten)
//! 4. response rewrite     headers always, body only for text/html
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{uri::Scheme, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::SkipConfig;
use crate::http::request::{prepare_upstream, request_id, MakeRequestUuid};
use crate::http::response::rewrite_response;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::rewrite::HostRewriter;
use crate::transport::Transport;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn Transport>,
    pub upstream_scheme: Scheme,
    pub max_html_body_bytes: usize,
}

/// HTTP server for the SCION browsing proxy.
pub struct HttpServer {
    router: Router,
    config: SkipConfig,
    transport: Arc<dyn Transport>,
}

impl HttpServer {
    /// Create a new HTTP server delegating to `transport`.
    pub fn new(config: SkipConfig, transport: Arc<dyn Transport>) -> Self {
        let state = AppState {
            transport: transport.clone(),
            upstream_scheme: config.transport.upstream_scheme(),
            max_html_body_bytes: config.rewrite.max_html_body_bytes,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            transport,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then release the transport.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_scheme = %self.config.transport.upstream_scheme(),
            "HTTP server starting"
        );

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await;

        self.transport.shutdown().await;
        tracing::info!("HTTP server stopped");
        served
    }
}

/// Main proxy handler.
/// Demunges the host, delegates to the transport, rewrites the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let request_method = request.method().clone();
    let method = request_method.to_string();

    // 1 + 2. Address resolution and negotiation guard
    let (request, demunged) = match prepare_upstream(request, &state.upstream_scheme) {
        Ok(prepared) => prepared,
        Err(e) => return unavailable(&request_id, &method, start_time, e.to_string()),
    };
    let rewriter = match HostRewriter::new(&demunged) {
        Ok(r) => r,
        Err(e) => return unavailable(&request_id, &method, start_time, e.to_string()),
    };

    tracing::debug!(
        request_id = %request_id,
        host = %demunged.munged(),
        upstream = %demunged.canonical(),
        scion = demunged.is_scion(),
        path = %request.uri().path(),
        "Proxying request"
    );

    // 3. Delegation, fail fast
    let response = match state.transport.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            metrics::record_transport_error();
            return unavailable(&request_id, &method, start_time, e.to_string());
        }
    };

    // 4. Response rewriting
    let rewritten =
        rewrite_response(response, &request_method, &rewriter, state.max_html_body_bytes).await;
    match rewritten {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                upstream = %demunged.canonical(),
                error = %e,
                "Response rewrite failed"
            );
            metrics::record_request(&method, StatusCode::BAD_GATEWAY.as_u16(), start_time);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// 503 carrying the failure text, headers untouched by the rewriter.
fn unavailable(request_id: &str, method: &str, start_time: Instant, message: String) -> Response {
    tracing::debug!(request_id = %request_id, error = %message, "Upstream unavailable");
    metrics::record_request(method, StatusCode::SERVICE_UNAVAILABLE.as_u16(), start_time);
    (StatusCode::SERVICE_UNAVAILABLE, message).into_response()
}
