use crate::config::types::{Config, CrawlerConfig, ElasticsearchConfig, IndexBackend, IndexConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool size
pub const MAX_WORKERS: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_index_config(&config.index)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_workers < 1 || config.max_workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_workers
        )));
    }

    if config.idle_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "idle_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates index configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if !is_valid_index_name(&config.name) {
        return Err(ConfigError::Validation(format!(
            "index name must be non-empty, lowercase alphanumeric or '_', got '{}'",
            config.name
        )));
    }

    match config.backend {
        IndexBackend::Elasticsearch => validate_elasticsearch_config(&config.elasticsearch)?,
        IndexBackend::Sqlite => {
            if config.sqlite.database_path.is_empty() {
                return Err(ConfigError::Validation(
                    "database_path cannot be empty".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_elasticsearch_config(config: &ElasticsearchConfig) -> Result<(), ConfigError> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation(
            "elasticsearch host cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "elasticsearch request_timeout_secs must be > 0".to_string(),
        ));
    }

    Url::parse(&config.url())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid elasticsearch address: {}", e)))?;

    Ok(())
}

/// Index names double as SQLite table names, so they are kept to a safe
/// identifier alphabet that is also a legal Elasticsearch index name.
pub fn is_valid_index_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validates a seed URL: it must be absolute http(s) with a host
pub fn validate_seed_url(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(url)
}
