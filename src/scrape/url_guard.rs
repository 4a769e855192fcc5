// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! URL validation guarding outbound fetches
//!
//! Every URL the service fetches, including each redirect hop, passes through
//! [`validate_url`] first. Matching is purely textual on the parsed host; no DNS
//! resolution happens here.

use std::borrow::Cow;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use thiserror::Error;
use url::{Host, Url};

/// Reasons a candidate URL is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRejection {
    /// Input does not parse as an absolute URL
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// Scheme other than http/https
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Host is loopback, private, link-local or otherwise internal
    #[error("Private network address blocked: {0}")]
    PrivateNetworkAccess(String),
}

impl UrlRejection {
    /// Whether this rejection is an SSRF block rather than bad input
    pub fn is_security_rejection(&self) -> bool {
        matches!(self, UrlRejection::PrivateNetworkAccess(_))
    }
}

/// A URL that passed [`validate_url`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    raw: String,
    url: Url,
}

impl ValidatedUrl {
    /// The (scheme-defaulted) input exactly as it was accepted
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form used for requests
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Canonical cache key
    ///
    /// Scheme and host are lower-cased by the parser, default ports dropped,
    /// the fragment removed and a bare root path trimmed. Path and query keep
    /// their case.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        if url.path() == "/" && url.query().is_none() {
            url.as_str().trim_end_matches('/').to_string()
        } else {
            url.as_str().to_string()
        }
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse and authorize a candidate URL
///
/// Host checks run before the scheme check, so a private host is always
/// reported as [`UrlRejection::PrivateNetworkAccess`].
pub fn validate_url(input: &str) -> Result<ValidatedUrl, UrlRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlRejection::MalformedUrl("URL is empty".to_string()));
    }

    let candidate = with_default_scheme(trimmed);
    let url = Url::parse(&candidate).map_err(|e| UrlRejection::MalformedUrl(e.to_string()))?;

    if let Some(host) = url.host() {
        if let Some(reason) = private_host_reason(&host) {
            return Err(UrlRejection::PrivateNetworkAccess(format!(
                "{} ({})",
                host, reason
            )));
        }
    }

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlRejection::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlRejection::MalformedUrl("URL has no host".to_string()));
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlRejection::MalformedUrl(
            "credentials in URL are not allowed".to_string(),
        ));
    }

    Ok(ValidatedUrl {
        raw: candidate.into_owned(),
        url,
    })
}

/// Prepend `https://` to bare hosts such as `example.com` or `example.com:8080/x`
///
/// Inputs like `mailto:x` or `javascript:y` keep their scheme so they are
/// rejected as unsupported instead of being reinterpreted as hosts.
fn with_default_scheme(input: &str) -> Cow<'_, str> {
    if input.contains("://") {
        return Cow::Borrowed(input);
    }
    match input.split_once(':') {
        Some((_, rest)) if !rest.starts_with(|c: char| c.is_ascii_digit()) => Cow::Borrowed(input),
        _ => Cow::Owned(format!("https://{}", input)),
    }
}

fn private_host_reason(host: &Host<&str>) -> Option<&'static str> {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return Some("localhost");
            }
            // Non-special schemes leave IP literals as opaque domains
            if let Ok(v4) = domain.parse::<Ipv4Addr>() {
                return ipv4_reason(v4);
            }
            let bare = domain.trim_start_matches('[').trim_end_matches(']');
            if let Ok(v6) = bare.parse::<Ipv6Addr>() {
                return ipv6_reason(v6);
            }
            None
        }
        Host::Ipv4(v4) => ipv4_reason(*v4),
        Host::Ipv6(v6) => ipv6_reason(*v6),
    }
}

fn ipv4_reason(ip: Ipv4Addr) -> Option<&'static str> {
    if ip.is_loopback() {
        Some("loopback")
    } else if ip.is_private() {
        Some("private range")
    } else if ip.is_link_local() {
        Some("link-local")
    } else if ip.octets()[0] == 0 {
        Some("unspecified")
    } else {
        None
    }
}

fn ipv6_reason(ip: Ipv6Addr) -> Option<&'static str> {
    let first = ip.segments()[0];
    if ip.is_loopback() {
        Some("loopback")
    } else if ip.is_unspecified() {
        Some("unspecified")
    } else if first & 0xffc0 == 0xfe80 {
        Some("link-local")
    } else if first & 0xfe00 == 0xfc00 {
        Some("unique-local")
    } else if let Some(v4) = ip.to_ipv4_mapped() {
        ipv4_reason(v4)
    } else {
        None
    }
}
