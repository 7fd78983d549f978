//! Site-Indexer main entry point
//!
//! This is the command-line interface for the Site-Indexer crawler.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use site_indexer::config::{load_config_with_hash, Config, IndexBackend, MAX_WORKERS};
use site_indexer::crawler::run_crawl_with_config;
use site_indexer::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Indexer: crawl one website into a search index
///
/// Starting from the given URL, Site-Indexer follows links on the same host
/// breadth-first up to a maximum depth and stores every page it fetches
/// (title, URL and HTML) in Elasticsearch or a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "site-indexer")]
#[command(version)]
#[command(about = "Crawl a website into a search index", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Number of concurrent workers
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WORKERS as i64))]
    max_workers: Option<u32>,

    /// Maximum link depth from the seed page
    #[arg(long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Index backend to write pages into
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Elasticsearch,
    Sqlite,
}

impl From<BackendArg> for IndexBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Elasticsearch => IndexBackend::Elasticsearch,
            BackendArg::Sqlite => IndexBackend::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    tracing::info!(
        "Crawling {} into {:?} index '{}'",
        cli.url,
        config.index.backend,
        config.index.name
    );

    let stats = match run_crawl_with_config(&config, &cli.url).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("crawl did not complete");
        }
    };

    if !cli.quiet {
        print_statistics(&stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_indexer=info,warn"),
            1 => EnvFilter::new("site_indexer=debug,info"),
            2 => EnvFilter::new("site_indexer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given and applies the flag overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.max_workers {
        config.crawler.max_workers = workers;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(backend) = cli.backend {
        config.index.backend = backend.into();
    }

    Ok(config)
}
