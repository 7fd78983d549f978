//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client (connect timeout, TLS policy)
//! - GET requests returning the page body as text
//! - Error classification into timeout / network / protocol failures

use crate::config::CrawlerConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be fetched
///
/// The worker treats every variant the same way: the page is dropped and the
/// URL is not retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connecting or reading took too long
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Connection refused, DNS failure, TLS failure, reset
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Malformed response, undecodable body, bad redirect
    #[error("protocol error fetching {url}: {message}")]
    Protocol { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error for `url`
    fn classify(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() || error.is_request() {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Protocol {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Returns true for the timeout class
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Builds the HTTP client shared by all workers
///
/// Only the connect phase is bounded; a slow body keeps the worker busy but
/// never hangs the connection attempt. When `accept_invalid_certs` is set,
/// certificate verification is disabled so that sites with broken TLS are
/// still crawled. With rustls this also skips the hostname check, so there is
/// no separate hostname switch.
///
/// # Example
///
/// ```no_run
/// use site_indexer::config::CrawlerConfig;
/// use site_indexer::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body as text
///
/// Any HTTP status is accepted: error pages are returned like any other
/// body, matching what a browser would render for the URL.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(String)` - The decoded body
/// * `Err(FetchError)` - The request or body read failed
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} answered HTTP {}", url, status.as_u16());
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::classify(url, e))
}
