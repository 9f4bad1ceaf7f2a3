//! Canonical SCION addresses.
//!
//! An address is an ISD-AS pair plus a host token, written `ISD-AS,host`
//! (e.g. `1-ff00:0:110,192.0.2.1`). Inside a URL authority it is wrapped
//! in brackets: `[1-ff00:0:110,192.0.2.1]`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing canonical addresses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrError {
    #[error("missing '-' between ISD and AS in {0:?}")]
    MissingIaSeparator(String),

    #[error("invalid ISD {0:?}: expected decimal digits")]
    InvalidIsd(String),

    #[error("invalid AS {0:?}: expected hex digits and ':'")]
    InvalidAs(String),

    #[error("missing ',' between ISD-AS and host in {0:?}")]
    MissingHostSeparator(String),

    #[error("empty host in {0:?}")]
    EmptyHost(String),
}

/// The isolation domain and autonomous system part of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsdAs {
    isd: String,
    asn: String,
}

impl IsdAs {
    /// The ISD, as written (decimal).
    pub fn isd(&self) -> &str {
        &self.isd
    }

    /// The AS, as written (hex groups separated by ':').
    pub fn asn(&self) -> &str {
        &self.asn
    }

    /// The AS with ':' replaced by '_', as it appears in a hostname label.
    pub fn asn_munged(&self) -> String {
        self.asn.replace(':', "_")
    }
}

impl FromStr for IsdAs {
    type Err = AddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (isd, asn) = s
            .split_once('-')
            .ok_or_else(|| AddrError::MissingIaSeparator(s.to_string()))?;

        if isd.is_empty() || !isd.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddrError::InvalidIsd(isd.to_string()));
        }
        if asn.is_empty() || !asn.bytes().all(|b| b.is_ascii_hexdigit() || b == b':') {
            return Err(AddrError::InvalidAs(asn.to_string()));
        }

        Ok(Self {
            isd: isd.to_string(),
            asn: asn.to_string(),
        })
    }
}

impl fmt::Display for IsdAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.isd, self.asn)
    }
}

/// A full SCION endpoint address: ISD-AS plus host token.
///
/// The host token is opaque here; it is usually an IP address but may carry
/// further structure the transport understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScionAddr {
    ia: IsdAs,
    host: String,
}

impl ScionAddr {
    pub fn ia(&self) -> &IsdAs {
        &self.ia
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The bracketed form used as a URL authority: `[ISD-AS,host]`.
    pub fn bracketed(&self) -> String {
        format!("[{}]", self)
    }
}

impl FromStr for ScionAddr {
    type Err = AddrError;

    /// Parses `ISD-AS,host`, with or without surrounding brackets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        let (ia, host) = inner
            .split_once(',')
            .ok_or_else(|| AddrError::MissingHostSeparator(s.to_string()))?;

        if host.is_empty() {
            return Err(AddrError::EmptyHost(s.to_string()));
        }

        Ok(Self {
            ia: ia.parse()?,
            host: host.to_string(),
        })
    }
}

impl fmt::Display for ScionAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.ia, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_and_bracketed() {
        let bare: ScionAddr = "1-ff00:0:110,192.0.2.1".parse().unwrap();
        let bracketed: ScionAddr = "[1-ff00:0:110,192.0.2.1]".parse().unwrap();

        assert_eq!(bare, bracketed);
        assert_eq!(bare.ia().isd(), "1");
        assert_eq!(bare.ia().asn(), "ff00:0:110");
        assert_eq!(bare.host(), "192.0.2.1");
    }

    #[test]
    fn display_matches_input() {
        let addr: ScionAddr = "17-ffaa:1:e4b,[fd00::1]".parse().unwrap();
        assert_eq!(addr.to_string(), "17-ffaa:1:e4b,[fd00::1]");
        assert_eq!(addr.bracketed(), "[17-ffaa:1:e4b,[fd00::1]]");
    }

    #[test]
    fn asn_munged_replaces_colons() {
        let ia: IsdAs = "1-ff00:0:110".parse().unwrap();
        assert_eq!(ia.asn_munged(), "ff00_0_110");
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(
            "1-ff00:0:110".parse::<ScionAddr>(),
            Err(AddrError::MissingHostSeparator("1-ff00:0:110".into()))
        );
        assert_eq!(
            "1-ff00:0:110,".parse::<ScionAddr>(),
            Err(AddrError::EmptyHost("1-ff00:0:110,".into()))
        );
        assert_eq!(
            "x-ff00:0:110,10.0.0.1".parse::<ScionAddr>(),
            Err(AddrError::InvalidIsd("x".into()))
        );
        assert_eq!(
            "1-ff00_0_110,10.0.0.1".parse::<ScionAddr>(),
            Err(AddrError::InvalidAs("ff00_0_110".into()))
        );
        assert_eq!(
            "ff00:0:110,10.0.0.1".parse::<ScionAddr>(),
            Err(AddrError::MissingIaSeparator("ff00:0:110".into()))
        );
    }
}
