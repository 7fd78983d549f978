use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased and carries no port. URLs without a host
/// (`mailto:`, `data:`) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_indexer::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
