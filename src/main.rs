//! SCION browsing proxy (skip).
//!
//! Point the browser's proxy settings at this process and type addresses as
//! `1-ff00_0_110-192.0.2.1.scion`.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                ┌──────────────────────────────────────────────┐
//!     Host: 1-ff00_0_110-    │                 skip-proxy                    │
//!       192.0.2.1.scion      │                                               │
//!     ──────────────────────▶│  request ──▶ demunge ──▶ [1-ff00:0:110,       │
//!                            │                            192.0.2.1]         │
//!                            │                              │                │
//!                            │                              ▼                │
//!                            │                        ┌───────────┐          │    SCION
//!                            │                        │ transport │──────────┼──▶ host
//!                            │                        └─────┬─────┘          │
//!                            │                              │                │
//!     ◀──────────────────────│  rewrite headers + HTML ◀────┘                │
//!     http://1-ff00_0_110-   │                                               │
//!       192.0.2.1.scion/...  └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use skip_proxy::config::loader::{load_config, ConfigError};
use skip_proxy::config::validation::validate_config;
use skip_proxy::observability::{logging, metrics};
use skip_proxy::{HttpServer, HttpsTransport, Shutdown, SkipConfig};

#[derive(Parser)]
#[command(name = "skip-proxy")]
#[command(about = "Browse SCION hosts through munged hostnames", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SkipConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability);

    tracing::info!("skip-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_scheme = %config.transport.scheme,
        insecure_skip_verify = config.transport.insecure_skip_verify,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let transport = Arc::new(HttpsTransport::new(&config.transport)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    HttpServer::new(config, transport)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
