//! Parsing policy for the warnings site
//!
//! This module turns fetched documents into crawl decisions and records:
//! - Resolving how many list pages exist
//! - Extracting detail links from list pages
//! - Extracting warning bodies from detail pages
//!
//! Every function here is a pure function of its input document.

mod content;
mod links;
mod result_count;
pub mod selectors;

pub use content::{extract_content, ExtractedContent, PARAGRAPH_SEPARATOR};
pub use links::{extract_detail_links, LinkExtraction};
pub use result_count::{
    pages_for_results, parse_result_count, read_result_count, resolve_page_count,
};

use crate::ExtractionError;
use scraper::Html;
use url::Url;

/// A fetched and parsed results-listing page
pub struct ListPage {
    page: u32,
    url: Url,
    document: Html,
}

impl ListPage {
    /// Parses a list page body
    ///
    /// # Errors
    ///
    /// * `ExtractionError::InvalidPageIndex` - list pages are numbered from 1
    pub fn parse(page: u32, url: Url, body: &str) -> Result<Self, ExtractionError> {
        if page < 1 {
            return Err(ExtractionError::InvalidPageIndex(page));
        }

        Ok(Self {
            page,
            url,
            document: Html::parse_document(body),
        })
    }

    /// The 1-based page index
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The URL the page was fetched from; relative links resolve against it
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

impl std::fmt::Debug for ListPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListPage")
            .field("page", &self.page)
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// A link from a list page to one warning's detail page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetailLink {
    url: Url,
}

impl DetailLink {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}
