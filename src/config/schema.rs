//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use axum::http::uri::Scheme;
use serde::{Deserialize, Serialize};

/// Root configuration for the SCION browsing proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SkipConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream transport settings.
    pub transport: TransportConfig,

    /// Response rewriting limits.
    pub rewrite: RewriteConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8888").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8888".to_string(),
        }
    }
}

/// Upstream transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Scheme used to reach the demunged host ("https" or "http").
    pub scheme: String,

    /// Accept any upstream certificate.
    pub insecure_skip_verify: bool,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Largest request body forwarded upstream.
    pub max_request_body_bytes: usize,
}

impl TransportConfig {
    /// The scheme requests are rewritten to before delegation.
    pub fn upstream_scheme(&self) -> Scheme {
        if self.scheme.eq_ignore_ascii_case("http") {
            Scheme::HTTP
        } else {
            Scheme::HTTPS
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            insecure_skip_verify: true,
            connect_timeout_secs: 10,
            max_request_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Response rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Largest HTML body buffered for rewriting.
    pub max_html_body_bytes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_html_body_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directives, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "skip_proxy=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
