//! Selection rules encoding the warnings site's HTML structure
//!
//! Each rule is a plain predicate over a `scraper` element so it can be unit
//! tested against fixture documents. Replacing the target site means
//! replacing this file.

use scraper::{ElementRef, Html};

/// Class marker of the "N results" summary element
pub const RESULT_SUMMARY_CLASS: &str = "numResults";

/// Class marker of each result's link to its detail page
pub const RESULT_ITEM_LINK_CLASS: &str = "result_path_link";

/// Classes that together mark a detail page's content container
pub const CONTENT_CONTAINER_CLASSES: [&str; 2] = ["standard_content", "highlightable"];

/// Returns true if the element's `class` attribute contains `needle`
///
/// This is a substring test on the raw attribute, the same looseness as
/// XPath's `contains(@class, ...)`.
fn class_attr_contains(element: &ElementRef<'_>, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|classes| classes.contains(needle))
}

/// Returns the parent of an element if the parent is itself an element
fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// The result summary: a `numResults` element directly inside a `div`
pub fn is_result_summary_node(element: &ElementRef<'_>) -> bool {
    class_attr_contains(element, RESULT_SUMMARY_CLASS)
        && parent_element(element).is_some_and(|parent| parent.value().name() == "div")
}

/// A result item's link element, anywhere in the list page
pub fn is_result_item_link(element: &ElementRef<'_>) -> bool {
    class_attr_contains(element, RESULT_ITEM_LINK_CLASS)
}

/// The detail page's content container: a `div` carrying both container classes
pub fn is_content_container(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "div"
        && CONTENT_CONTAINER_CLASSES
            .iter()
            .all(|class| value.classes().any(|c| c == *class))
}

/// A `<p>` whose parent is exactly `container` (not a deeper descendant)
pub fn is_direct_paragraph_child(container: &ElementRef<'_>, element: &ElementRef<'_>) -> bool {
    element.value().name() == "p"
        && element
            .parent()
            .is_some_and(|parent| parent.id() == container.id())
}

/// Iterates every element of the document in document order
pub fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

/// Returns the first element in document order matching `rule`
pub fn find_first<'a, F>(document: &'a Html, rule: F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    elements(document).find(|element| rule(element))
}
