//! Index module for persisting crawled pages
//!
//! This module handles everything on the write and read side of the page
//! index, including:
//! - The `Indexer` trait shared by all backends
//! - The document schema `{id, title, url, content}`
//! - An Elasticsearch backend speaking the REST API
//! - A SQLite backend for running without a search cluster
//! - The HTML-stripping analyzer used by the SQLite backend

mod analyzer;
mod elasticsearch;
mod schema;
mod sqlite;

pub use analyzer::{strip_html, tokenize};
pub use elasticsearch::ElasticsearchIndexer;
pub use sqlite::SqliteIndexer;

use crate::config::{IndexBackend, IndexConfig};
use crate::{IndexError, IndexResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A crawled page as stored in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlDocument {
    /// Hex SHA-256 of `url`; the upsert key
    pub id: String,
    pub title: String,
    pub url: String,
    /// Raw page HTML
    pub content: String,
}

impl CrawlDocument {
    /// Builds a document for a canonical URL, deriving its id
    pub fn new(url: &str, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: crate::url::document_id(url),
            title: title.into(),
            url: url.to_string(),
            content: content.into(),
        }
    }
}

/// A search hit without the page body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Search parameters: optional title, url and content match, 1-based paging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Matched against the page text with markup stripped
    pub content: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub size: u32,
}

impl SearchQuery {
    /// Matches everything, first page of 20
    pub fn new() -> Self {
        Self {
            title: None,
            url: None,
            content: None,
            page: 1,
            size: 20,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn page(mut self, page: u32, size: u32) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    /// Number of hits to skip; page 0 is treated as page 1
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.size)
    }

    /// The non-empty field matches, in a stable order
    pub fn matches(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", self.title.as_deref()),
            ("url", self.url.as_deref()),
            ("content", self.content.as_deref()),
        ]
            .into_iter()
            .filter_map(|(field, value)| match value {
                Some(v) if !v.is_empty() => Some((field, v)),
                _ => None,
            })
            .collect()
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to a submitted page that was not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The backend stored the document
    Stored,

    /// The write failed for a non-schema reason and was dropped
    Dropped,
}

/// Trait for index backend implementations
///
/// Implementations must be safe for concurrent use by all crawl workers.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Name of the destination index
    fn index_name(&self) -> &str;

    /// Creates the index with the `content` HTML-stripping mapping if it does
    /// not exist yet. Calling it again is a no-op.
    async fn ensure_index(&self) -> IndexResult<()>;

    /// Writes one document, replacing any document with the same id
    ///
    /// Returns every failure; callers normally go through
    /// [`Indexer::index_document`] instead.
    async fn put_document(&self, doc: &CrawlDocument) -> IndexResult<()>;

    /// Searches by title, url and/or content
    async fn search(&self, query: &SearchQuery) -> IndexResult<Vec<PageSummary>>;

    /// Fetches one document by id
    async fn get_document(&self, id: &str) -> IndexResult<Option<CrawlDocument>>;

    /// Submits a crawled page
    ///
    /// A schema rejection is returned to the caller. Any other failure is
    /// logged and reported as [`Submission::Dropped`]; the document is not
    /// retried.
    async fn index_document(&self, doc: &CrawlDocument) -> IndexResult<Submission> {
        match self.put_document(doc).await {
            Ok(()) => {
                tracing::info!("Indexed page {} into {}", doc.url, self.index_name());
                Ok(Submission::Stored)
            }
            Err(e @ IndexError::Schema(_)) => {
                tracing::error!("Index rejected page {}: {}", doc.url, e);
                Err(e)
            }
            Err(e) => {
                tracing::error!("Unexpected failure indexing page {}: {}", doc.url, e);
                Ok(Submission::Dropped)
            }
        }
    }
}

/// Builds the indexer selected by the configuration
pub fn create_indexer(config: &IndexConfig) -> IndexResult<Arc<dyn Indexer>> {
    let indexer: Arc<dyn Indexer> = match config.backend {
        IndexBackend::Elasticsearch => Arc::new(ElasticsearchIndexer::from_config(config)?),
        IndexBackend::Sqlite => Arc::new(SqliteIndexer::open(
            Path::new(&config.sqlite.database_path),
            &config.name,
        )?),
    };
    Ok(indexer)
}
