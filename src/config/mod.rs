//! Configuration module for Site-Indexer
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every setting has a default; CLI flags override the
//! crawler settings after loading.
//!
//! # Example
//!
//! ```no_run
//! use site_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-indexer.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_workers);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, ElasticsearchConfig, IndexBackend, IndexConfig, SqliteConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{is_valid_index_name, validate, validate_seed_url, MAX_WORKERS};
