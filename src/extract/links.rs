//! Detail-link extraction from list pages

use crate::extract::selectors::{elements, is_result_item_link};
use crate::extract::{DetailLink, ListPage};
use crate::url::{resolve_link, AllowedDomains};
use scraper::{ElementRef, Selector};

/// Outcome of scanning one list page for result links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkExtraction {
    /// Allowed detail links, in document order
    pub links: Vec<DetailLink>,

    /// Result links that resolved outside the allowed domains
    pub rejected: Vec<String>,
}

/// Extracts every result item's detail link from a list page
///
/// Links are resolved against the list page URL and kept in document order.
/// A page without result items yields an empty extraction, not an error.
pub fn extract_detail_links(page: &ListPage, allowed: &AllowedDomains) -> LinkExtraction {
    let mut extraction = LinkExtraction::default();

    for element in elements(page.document()).filter(is_result_item_link) {
        let Some(href) = item_href(&element) else {
            tracing::debug!("Result item without href on list page {}", page.page());
            continue;
        };

        let Some(url) = resolve_link(href, page.url()) else {
            tracing::debug!("Skipping unusable result link {:?}", href);
            continue;
        };

        if allowed.allows(&url) {
            extraction.links.push(DetailLink::new(url));
        } else {
            extraction.rejected.push(url.to_string());
        }
    }

    extraction
}

/// The href of a result item: its own, or its first descendant anchor's
fn item_href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    if let Some(href) = element.value().attr("href") {
        return Some(href);
    }

    let anchor = Selector::parse("a[href]").ok()?;
    element
        .select(&anchor)
        .next()
        .and_then(|a| a.value().attr("href"))
}
