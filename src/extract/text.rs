//! Text helpers for element content.

use scraper::ElementRef;

/// Returns the element's text with whitespace runs collapsed to one space.
///
/// Text nodes are concatenated as-is, so spacing present in the markup is
/// kept and spacing absent from it is not invented.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapses all whitespace runs to a single space and trims the ends.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `Some(value)` only when it is non-empty.
pub(crate) fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
