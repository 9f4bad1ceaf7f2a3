//! Response rewriting from the upstream address space to the client's.
//!
//! Replaces every `http://<canonical>` and `https://<canonical>` with
//! `http://<munged>`. The munged side is always plain HTTP because the
//! browser talks to this proxy unencrypted.
//!
//! # Design Decisions
//! - Textual, not structural: any occurrence matches, inside markup or not
//! - Pattern compiled once per request; it depends on the request's host
//! - Unchanged input is returned borrowed so untouched headers stay byte-identical

use std::borrow::Cow;

use axum::http::{HeaderMap, HeaderValue};
use regex::bytes::{NoExpand, Regex};

use crate::addr::Demunged;

/// Rewrites canonical-address URLs into munged-host URLs.
#[derive(Debug, Clone)]
pub struct HostRewriter {
    pattern: Regex,
    replacement: Vec<u8>,
}

impl HostRewriter {
    /// Compiles the substitution for one request's host pair.
    pub fn new(pair: &Demunged) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("https?://{}", regex::escape(pair.canonical())))?;
        Ok(Self {
            pattern,
            replacement: format!("http://{}", pair.munged()).into_bytes(),
        })
    }

    /// Applies the substitution to a byte buffer.
    pub fn rewrite<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        self.pattern
            .replace_all(input, NoExpand(self.replacement.as_slice()))
    }

    /// Copies every header value from `src` into `dst`, rewritten.
    ///
    /// Multi-valued headers keep all values, in order.
    pub fn rewrite_headers(&self, src: &HeaderMap, dst: &mut HeaderMap) {
        for (name, value) in src {
            let rewritten = match self.rewrite(value.as_bytes()) {
                Cow::Borrowed(_) => value.clone(),
                Cow::Owned(bytes) => match HeaderValue::from_bytes(&bytes) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(
                            header = %name,
                            error = %e,
                            "Rewritten header value invalid, keeping original"
                        );
                        value.clone()
                    }
                },
            };
            dst.append(name.clone(), rewritten);
        }
    }
}
