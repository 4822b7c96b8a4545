//! fma-warnings: a crawler for the FMA "warnings and alerts" listing
//!
//! This crate walks the paginated warnings listing, follows every result's
//! detail link, and extracts the body of each warning into a JSON record
//! written as one file per warning.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only the variants returned from [`crawler::Coordinator::run`] abort a run.
/// Per-page problems are counted in the [`output::CrawlReport`] instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to fetch first list page {url}: {source}")]
    FirstPage {
        url: String,
        source: crawler::FetchError,
    },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while applying the site's parsing policy to a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The first list page has no result summary region
    #[error("Result summary region not found on first list page")]
    MissingResultSummary,

    /// The result summary region exists but holds no number
    #[error("No result count in summary text: {text:?}")]
    NoResultCount { text: String },

    /// The detail page does not carry the expected content container
    #[error("Content container not found on {url}")]
    MissingContainer { url: String },

    /// The result count needs more list pages than a run may visit
    #[error("{results} results need {pages} list pages, above the limit of {max_pages}")]
    TooManyPages {
        results: u64,
        pages: u64,
        max_pages: u32,
    },

    /// List pages are numbered from 1
    #[error("Invalid list page index: {0}")]
    InvalidPageIndex(u32),
}

impl ExtractionError {
    /// Returns true if this failure must stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingResultSummary | Self::NoResultCount { .. } | Self::TooManyPages { .. }
        )
    }
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Domain not in allow-list: {0}")]
    NotAllowed(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{derive_id, WarningRecord};
pub use state::CrawlPhase;
pub use self::url::{extract_domain, AllowedDomains};
