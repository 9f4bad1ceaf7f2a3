//! Munging: SCION addresses as DNS-safe hostnames.
//!
//! Browsers refuse `[1-ff00:0:110,192.0.2.1]` as a hostname, so the address
//! is typed as `1-ff00_0_110-192.0.2.1.scion` instead and demunged here.

use std::sync::LazyLock;

use regex::Regex;

use crate::addr::ia::ScionAddr;

/// Suffix marking a hostname as routed through the SCION proxy.
pub const MARKER_SUFFIX: &str = ".scion";

/// `<ISD>-<AS with '_' for ':'>-<host>`. The host group is greedy.
static MUNGED_SCION_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)-([_0-9A-Fa-f]+)-(.*)$").expect("munged address pattern is valid")
});

const ISD_GROUP: usize = 1;
const AS_GROUP: usize = 2;
const HOST_GROUP: usize = 3;

/// Reverts a browser hostname to the address the transport understands.
///
/// A munged SCION address becomes its bracketed canonical form; any other
/// hostname is returned with the `.scion` marker removed, or unchanged. A
/// trailing `:port` is set aside first and appended to the result.
pub fn demunge(hostname: &str) -> String {
    let (hostname, port) = split_port(hostname);
    let name = hostname.strip_suffix(MARKER_SUFFIX).unwrap_or(hostname);

    let mut demunged = match MUNGED_SCION_ADDR.captures(name) {
        Some(parts) => format!(
            "[{}-{},{}]",
            &parts[ISD_GROUP],
            parts[AS_GROUP].replace('_', ":"),
            &parts[HOST_GROUP],
        ),
        None => name.to_string(),
    };
    if let Some(port) = port {
        demunged.push(':');
        demunged.push_str(port);
    }
    demunged
}

/// Splits `name:port`. Bare IPv6 text (colons outside brackets) has no port.
fn split_port(hostname: &str) -> (&str, Option<&str>) {
    match hostname.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!name.contains(':') || name.ends_with(']')) =>
        {
            (name, Some(port))
        }
        _ => (hostname, None),
    }
}

/// Renders an address as the hostname a browser should be pointed at.
pub fn munge(addr: &ScionAddr) -> String {
    format!(
        "{}-{}-{}{}",
        addr.ia().isd(),
        addr.ia().asn_munged(),
        addr.host(),
        MARKER_SUFFIX
    )
}

/// The host a client asked for, paired with the address it stands for.
///
/// Built once per request from the inbound `Host` and used to rewrite the
/// response back into the client's address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demunged {
    munged: String,
    canonical: String,
}

impl Demunged {
    pub fn from_host(host: &str) -> Self {
        Self {
            munged: host.to_string(),
            canonical: demunge(host),
        }
    }

    /// The host exactly as the client sent it.
    pub fn munged(&self) -> &str {
        &self.munged
    }

    /// The upstream address, bracketed for SCION hosts.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Whether the client addressed a SCION host rather than a plain name.
    pub fn is_scion(&self) -> bool {
        self.canonical.starts_with('[') && self.canonical.parse::<ScionAddr>().is_ok()
    }
}
