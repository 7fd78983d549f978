//! HTML parser for extracting the page title and anchors
//!
//! Parsing never fails: html5ever recovers from any malformed markup, a
//! missing or empty `<title>` becomes an empty string, and anchors without an
//! `href` are skipped.

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Text of the first `<title>` element, or empty
    pub title: String,

    /// Raw `href` values of every `<a>` element, in document order
    pub anchors: Vec<String>,

    /// The document re-serialized as HTML; this is what gets indexed
    pub content: String,
}

/// Parses HTML content and extracts the title and raw anchor hrefs
///
/// Hrefs are returned exactly as written; filtering and canonicalization are
/// left to [`crate::url::normalize_link`].
///
/// # Example
///
/// ```
/// use site_indexer::crawler::parse_page;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_page(html);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.anchors, vec!["/page".to_string()]);
/// ```
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: extract_anchors(&document),
        content: document.root_element().html(),
    }
}

/// Extracts the page title from the HTML document
///
/// Only the first `<title>` counts and its text is used as-is.
fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

/// Extracts raw href attributes from all anchors
fn extract_anchors(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
