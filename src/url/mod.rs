//! URL handling module
//!
//! This module provides domain extraction, wildcard matching, link resolution,
//! and the domain allow-list every request is checked against.

use crate::{UrlError, UrlResult};
use url::Url;

/// Returns the lowercase host of a URL, ignoring port, path and query
///
/// ```
/// use url::Url;
/// use fma_warnings::url::extract_domain;
///
/// let url = Url::parse("https://WWW.FMA.GOVT.NZ:443/warnings?start=2").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.fma.govt.nz".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks a domain against an exact or `*.`-prefixed wildcard pattern
///
/// A wildcard pattern matches its base domain and any subdomain of it.
/// Both arguments are expected to be lowercase already.
///
/// ```
/// use fma_warnings::url::matches_wildcard;
///
/// assert!(matches_wildcard("www.fma.govt.nz", "www.fma.govt.nz"));
/// assert!(matches_wildcard("*.fma.govt.nz", "fma.govt.nz"));
/// assert!(matches_wildcard("*.fma.govt.nz", "www.fma.govt.nz"));
/// assert!(!matches_wildcard("*.fma.govt.nz", "notfma.govt.nz"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

/// The set of domains the crawler may request
///
/// Patterns are either exact (`www.fma.govt.nz`) or wildcards
/// (`*.fma.govt.nz`, which also matches the bare domain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomains {
    patterns: Vec<String>,
}

impl AllowedDomains {
    /// Creates an allow-list from domain patterns (lowercased)
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the domain matches one of the patterns
    pub fn allows_domain(&self, domain: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| matches_wildcard(pattern, domain))
    }

    /// Returns true if the URL's host is allowed
    pub fn allows(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|domain| self.allows_domain(&domain))
    }

    /// Checks a URL against the allow-list, returning its domain on success
    pub fn check(&self, url: &Url) -> UrlResult<String> {
        let domain = extract_domain(url).ok_or(UrlError::MissingDomain)?;
        if self.allows_domain(&domain) {
            Ok(domain)
        } else {
            Err(UrlError::NotAllowed(domain))
        }
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
