//! Warning body extraction from detail pages

use crate::extract::selectors::{find_first, is_content_container, is_direct_paragraph_child};
use crate::ExtractionError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Separator placed between body paragraphs
pub const PARAGRAPH_SEPARATOR: &str = "\r\n";

/// Fields pulled out of one detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Page title, if the page has a non-empty `<title>`
    pub title: Option<String>,

    /// Direct-child paragraph texts joined with [`PARAGRAPH_SEPARATOR`]
    pub content: String,

    /// Number of paragraphs that made up `content`
    pub paragraphs: usize,
}

/// Extracts the warning body from a detail page document
///
/// Only `<p>` elements that are direct children of the content container
/// are used; paragraphs nested deeper (footnotes, embedded widgets) are not.
/// Each paragraph's text has leading and trailing whitespace trimmed;
/// inner whitespace is kept as is.
/// A container without such paragraphs gives an empty body, which is valid.
///
/// # Errors
///
/// * `ExtractionError::MissingContainer` - the page does not match the
///   warning template (redirect target, stale link, unrelated page)
pub fn extract_content(document: &Html, url: &Url) -> Result<ExtractedContent, ExtractionError> {
    let container =
        find_first(document, is_content_container).ok_or_else(|| ExtractionError::MissingContainer {
            url: url.to_string(),
        })?;

    let paragraphs: Vec<String> = container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| is_direct_paragraph_child(&container, child))
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect();

    Ok(ExtractedContent {
        title: extract_title(document),
        content: paragraphs.join(PARAGRAPH_SEPARATOR),
        paragraphs: paragraphs.len(),
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
