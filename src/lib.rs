//! Site-Indexer: a same-host web crawler feeding a searchable page index
//!
//! This crate crawls a website from a seed URL, follows same-host links up to
//! a bounded depth with a fixed pool of workers, and writes every fetched page
//! (title, URL, raw HTML) into an index backend.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl-level failures
///
/// Per-page failures never surface here; they are contained inside the
/// worker that produced them.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors returned by index backends
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backend rejected the request against its mapping/schema
    #[error("Document rejected by index schema: {0}")]
    Schema(String),

    /// Connectivity or other non-structural failure
    #[error("Transient index failure: {0}")]
    Transient(String),

    #[error("HTTP error talking to index: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed index response: {0}")]
    Response(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for index operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use index::{CrawlDocument, Indexer, Submission};
pub use output::CrawlStatistics;
pub use state::{PageOutcome, WorkerState};
pub use crate::url::{document_id, normalize_link};
