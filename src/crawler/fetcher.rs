//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Rejecting requests outside the allowed domains before dispatch
//! - Per-domain politeness through the [`DomainThrottle`]
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::crawler::scheduler::DomainThrottle;
use crate::url::AllowedDomains;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Why a fetch produced no document
///
/// None of these abort a run; the driver skips the page and counts the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URL (or its redirect target) is outside the allowed domains
    #[error("Domain not allowed: {url}")]
    DomainNotAllowed { url: String },

    /// Non-success HTTP status
    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    /// Request timed out
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// Connection could not be established
    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    /// Response is not an HTML document
    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    /// Any other transport failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Short label used to group failures in the run report
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DomainNotAllowed { .. } => "domain_not_allowed",
            Self::Status { status_code, .. } if *status_code == 404 => "not_found",
            Self::Status { status_code, .. } if *status_code == 429 => "rate_limited",
            Self::Status { .. } => "http_status",
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::ContentMismatch { .. } => "content_mismatch",
            Self::Network { .. } => "network",
        }
    }
}

/// Retrieves documents for the crawl driver
///
/// Implementations own transport concerns: politeness, timeouts and
/// domain restrictions. The driver makes no assumption about the order
/// in which concurrent fetches complete.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use fma_warnings::config::UserAgentConfig;
/// use fma_warnings::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher restricted to the allowed domains
pub struct HttpFetcher {
    client: Client,
    allowed: AllowedDomains,
    throttle: DomainThrottle,
}

impl HttpFetcher {
    pub fn new(client: Client, allowed: AllowedDomains, throttle: DomainThrottle) -> Self {
        Self {
            client,
            allowed,
            throttle,
        }
    }

    /// Creates a fetcher from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(&config.user_agent)?,
            AllowedDomains::new(&config.crawler.allowed_domains),
            DomainThrottle::from_config(&config.crawler),
        ))
    }

    pub fn throttle(&self) -> &DomainThrottle {
        &self.throttle
    }

    async fn fetch_allowed(&self, url: &Url, domain: &str) -> Result<FetchedPage, FetchError> {
        let _permit = self
            .throttle
            .acquire(domain)
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !self.allowed.allows(&final_url) {
            return Err(FetchError::DomainNotAllowed {
                url: final_url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: final_url.to_string(),
                content_type,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(&final_url, &e))?;

        Ok(FetchedPage {
            url: final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        async move {
            let domain = self
                .allowed
                .check(url)
                .map_err(|_| FetchError::DomainNotAllowed {
                    url: url.to_string(),
                })?;

            self.fetch_allowed(url, &domain).await
        }
    }
}

/// A missing Content-Type is given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    content_type.is_empty() || content_type.to_ascii_lowercase().contains("html")
}

fn classify_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let url = url.to_string();

    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect {
            url,
            message: error.to_string(),
        }
    } else if let Some(status) = error.status().filter(|s| *s != StatusCode::OK) {
        FetchError::Status {
            url,
            status_code: status.as_u16(),
        }
    } else {
        FetchError::Network {
            url,
            message: error.to_string(),
        }
    }
}
