//! Result-count resolution
//!
//! The listing never says "there is a next page", so the number of list pages
//! has to be bounded up front from the "N results" summary on the first page.

use crate::extract::selectors::{find_first, is_result_summary_node};
use crate::extract::ListPage;
use crate::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

/// First integer token, allowing thousands separators ("1,234")
static COUNT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*").unwrap());

/// Determines how many list pages must be visited
///
/// An explicit `override_pages` is authoritative: it is returned unchanged and
/// the first page is not inspected at all (it may even be missing).
/// Otherwise the result count is read from the first page and divided by
/// `page_size`, rounding up. Zero results yield zero pages.
///
/// # Errors
///
/// * `ExtractionError::MissingResultSummary` - no summary region on the page
/// * `ExtractionError::NoResultCount` - the region holds no number
/// * `ExtractionError::TooManyPages` - the count needs more than `max_pages` pages
pub fn resolve_page_count(
    first_page: Option<&ListPage>,
    override_pages: Option<u32>,
    page_size: u32,
    max_pages: u32,
) -> Result<u32, ExtractionError> {
    if let Some(pages) = override_pages {
        return Ok(pages);
    }

    let page = first_page.ok_or(ExtractionError::MissingResultSummary)?;
    let results = read_result_count(page.document())?;
    let pages = pages_for_results(results, page_size);

    match u32::try_from(pages) {
        Ok(pages) if pages <= max_pages => Ok(pages),
        _ => Err(ExtractionError::TooManyPages {
            results,
            pages,
            max_pages,
        }),
    }
}

/// Reads the total number of results from a list page's summary region
pub fn read_result_count(document: &Html) -> Result<u64, ExtractionError> {
    let summary =
        find_first(document, is_result_summary_node).ok_or(ExtractionError::MissingResultSummary)?;
    parse_result_count(&own_text(&summary))
}

/// Parses the first numeric token of a summary text such as "1,234 results"
pub fn parse_result_count(text: &str) -> Result<u64, ExtractionError> {
    let no_count = || ExtractionError::NoResultCount {
        text: text.trim().to_string(),
    };

    let token = COUNT_TOKEN.find(text).ok_or_else(no_count)?;
    let digits: String = token.as_str().chars().filter(|c| *c != ',').collect();
    digits.parse::<u64>().map_err(|_| no_count())
}

/// Converts a result count into a page count (ceiling division)
pub fn pages_for_results(results: u64, page_size: u32) -> u64 {
    results.div_ceil(u64::from(page_size.max(1)))
}

/// Text nodes that are direct children of the element
///
/// Falls back to the full descendant text when the number sits in a child
/// element (e.g. `<span class="numResults"><b>12</b> results</span>`).
fn own_text(element: &ElementRef<'_>) -> String {
    let direct: String = element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect();

    if COUNT_TOKEN.is_match(&direct) {
        direct
    } else {
        element.text().collect()
    }
}
