//! SCION address codec.
//!
//! # Data Flow
//! ```text
//! Browser Host header (munged, DNS-safe)
//!     → munge.rs (demunge: pattern match, '_' → ':', strip ".scion")
//!     → Demunged { munged, canonical }
//!     → http layer addresses the upstream with `canonical`
//!     → rewrite layer maps `canonical` back to `munged` in responses
//!
//! Operator tooling:
//!     ScionAddr (ia.rs) → munge.rs (munge) → hostname to type in a browser
//! ```
//!
//! # Design Decisions
//! - `demunge` never fails; anything that is not a munged address passes through
//! - The proxy keeps the client's original host string instead of re-munging,
//!   so a munge/demunge asymmetry can never leak into rewritten responses
//! - Wire format is fixed: `<ISD>-<AS with ':' as '_'>-<host>[.scion]`

pub mod ia;
pub mod munge;

pub use ia::{AddrError, IsdAs, ScionAddr};
pub use munge::{demunge, munge, Demunged, MARKER_SUFFIX};
