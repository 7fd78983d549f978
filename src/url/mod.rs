//! URL handling module for Site-Indexer
//!
//! This module provides link normalization, host extraction, and the
//! deterministic document id derived from a canonical URL.

mod domain;
mod normalize;

use sha2::{Digest, Sha256};
use url::Url;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::normalize_link;

/// Computes the index document id for a canonical URL
///
/// The id is the hex-encoded SHA-256 digest of the URL string, so indexing
/// the same URL twice overwrites one document instead of creating two.
///
/// # Examples
///
/// ```
/// use site_indexer::url::document_id;
///
/// assert_eq!(document_id("http://x.com/a"), document_id("http://x.com/a"));
/// assert_ne!(document_id("http://x.com/a"), document_id("http://x.com/b"));
/// ```
pub fn document_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true if both URLs share the same host (case-insensitive)
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
