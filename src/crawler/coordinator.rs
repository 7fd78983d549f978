//! Crawler coordinator - crawl orchestration
//!
//! The coordinator owns everything one crawl run shares:
//! - The HTTP client and the index backend
//! - The frontier and the visited set
//! - The statistics counters
//!
//! It bootstraps the index, seeds the frontier, spawns the worker pool and
//! waits for every worker to go idle.

use crate::config::{validate, validate_seed_url, Config};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::{Frontier, VisitedSet, WorkItem};
use crate::crawler::worker::{CrawlContext, Worker};
use crate::index::{create_indexer, Indexer};
use crate::output::{CrawlCounters, CrawlStatistics};
use crate::CrawlError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: Url,
    workers: u32,
    context: Arc<CrawlContext>,
}

impl Coordinator {
    /// Creates a coordinator using the index backend selected in `config`
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed_url` - Where the crawl starts; must be absolute http(s)
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or seed, or the backend
    ///   could not be opened
    pub fn new(config: &Config, seed_url: &str) -> Result<Self, CrawlError> {
        // Checked before the backend opens any file
        validate(config)?;
        let indexer = create_indexer(&config.index)?;
        Self::build(config, seed_url, indexer)
    }

    /// Creates a coordinator that writes into an existing indexer
    pub fn with_indexer(
        config: &Config,
        seed_url: &str,
        indexer: Arc<dyn Indexer>,
    ) -> Result<Self, CrawlError> {
        validate(config)?;
        Self::build(config, seed_url, indexer)
    }

    /// Assembles the crawl state from an already validated config
    fn build(
        config: &Config,
        seed_url: &str,
        indexer: Arc<dyn Indexer>,
    ) -> Result<Self, CrawlError> {
        let seed = validate_seed_url(seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = build_http_client(&config.crawler)?;

        let context = CrawlContext {
            client,
            indexer,
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            counters: CrawlCounters::new(),
            max_depth: config.crawler.max_depth,
            idle_timeout: Duration::from_secs(config.crawler.idle_timeout_secs),
        };

        Ok(Self {
            seed,
            workers: config.crawler.max_workers,
            context: Arc::new(context),
        })
    }

    /// Overrides the idle timeout; mostly useful to keep tests fast
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        if let Some(context) = Arc::get_mut(&mut self.context) {
            context.idle_timeout = timeout;
        }
        self
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.context.visited.len()
    }

    /// Runs the crawl to completion
    ///
    /// 1. Ensures the destination index exists
    /// 2. Enqueues the seed at depth 0
    /// 3. Spawns the worker pool
    /// 4. Waits for every worker to exit on its idle timeout
    pub async fn run(&self) -> Result<CrawlStatistics, CrawlError> {
        let started_at = Utc::now();
        let ctx = &self.context;

        ctx.indexer.ensure_index().await?;
        tracing::info!("Index {} is ready", ctx.indexer.index_name());

        ctx.frontier.enqueue(WorkItem::seed(self.seed.clone()));
        tracing::info!(
            "Starting crawl of {} with {} workers (max depth {})",
            self.seed,
            self.workers,
            ctx.max_depth
        );

        let mut pool = JoinSet::new();
        for id in 0..self.workers as usize {
            pool.spawn(Worker::new(id, ctx.clone()).run());
        }

        while let Some(joined) = pool.join_next().await {
            let summary = joined?;
            tracing::debug!("Worker {} joined", summary.worker_id);
        }

        let stats = ctx.counters.snapshot(started_at);
        tracing::info!(
            "Crawl completed: {} pages indexed, {} URLs visited in {}s",
            stats.pages_indexed,
            ctx.visited.len(),
            stats.duration_seconds()
        );

        Ok(stats)
    }
}

/// Crawls a site from `seed_url` with the default configuration
///
/// # Arguments
///
/// * `seed_url` - The page the crawl starts from
/// * `worker_count` - Number of concurrent workers, 1 to 10
/// * `max_depth` - Maximum link distance from the seed
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - All workers went idle
/// * `Err(CrawlError)` - The crawl could not start or a worker panicked
pub async fn run_crawl(
    seed_url: &str,
    worker_count: u32,
    max_depth: u32,
) -> Result<CrawlStatistics, CrawlError> {
    let mut config = Config::default();
    config.crawler.max_workers = worker_count;
    config.crawler.max_depth = max_depth;
    run_crawl_with_config(&config, seed_url).await
}

/// Crawls a site from `seed_url` using every setting in `config`
pub async fn run_crawl_with_config(
    config: &Config,
    seed_url: &str,
) -> Result<CrawlStatistics, CrawlError> {
    Coordinator::new(config, seed_url)?.run().await
}
