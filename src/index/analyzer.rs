//! Text analysis for the SQLite backend
//!
//! Mirrors the `html_stripper` analyzer installed on Elasticsearch indexes:
//! an HTML-stripping character filter followed by a standard-style tokenizer
//! with lowercasing.

use scraper::Html;

/// Removes markup and decodes entities, keeping the text content
///
/// Text nodes are joined with single spaces so words from adjacent elements
/// never run together.
pub fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits text into lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
