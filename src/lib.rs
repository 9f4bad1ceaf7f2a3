//! SCION browsing proxy library.
//!
//! Serves munged, DNS-safe hostnames such as `1-ff00_0_110-192.0.2.1.scion`
//! to a browser and forwards each request to the SCION address it encodes,
//! rewriting the upstream's absolute links back into munged form.

pub mod addr;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod transport;

pub use addr::{demunge, munge, Demunged, ScionAddr};
pub use config::SkipConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rewrite::HostRewriter;
pub use transport::{HttpsTransport, Transport, TransportError};
