use serde::Deserialize;

/// Main configuration structure for Site-Indexer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Maximum link depth from the seed page (0 = seed only)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// How long a worker waits on an empty frontier before exiting (seconds)
    #[serde(rename = "idle-timeout-secs")]
    pub idle_timeout_secs: u64,

    /// Connect timeout for page fetches (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate and hostname verification when fetching pages.
    ///
    /// On by default: crawled sites with broken certificates are still indexed.
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            max_depth: 2,
            idle_timeout_secs: 25,
            connect_timeout_secs: 20,
            accept_invalid_certs: true,
        }
    }
}

/// Which index backend receives crawled pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Elasticsearch,
    Sqlite,
}

/// Index destination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,

    /// Index name (Elasticsearch index or SQLite table)
    pub name: String,

    pub elasticsearch: ElasticsearchConfig,

    pub sqlite: SqliteConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Elasticsearch,
            name: "pages".to_string(),
            elasticsearch: ElasticsearchConfig::default(),
            sqlite: SqliteConfig::default(),
        }
    }
}

/// Elasticsearch connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticsearchConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,

    /// Bound on each request to the cluster, connect included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl ElasticsearchConfig {
    /// Base URL of the Elasticsearch REST API
    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            host: "elastic".to_string(),
            port: 9200,
            username: "elastic".to_string(),
            password: "pass123".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// SQLite index settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: "./pages.db".to_string(),
        }
    }
}
