//! Crawl statistics
//!
//! Workers record every processed item into a shared [`CrawlCounters`]; the
//! coordinator takes a [`CrawlStatistics`] snapshot once all workers exit.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlCounters {
    indexed: AtomicU64,
    already_visited: AtomicU64,
    depth_exceeded: AtomicU64,
    fetch_failed: AtomicU64,
    schema_rejected: AtomicU64,
    index_failed: AtomicU64,
    links_enqueued: AtomicU64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one processed work item
    pub fn record(&self, outcome: PageOutcome) {
        self.counter(outcome).fetch_add(1, Ordering::Relaxed);
    }

    /// Counts child links pushed onto the frontier
    pub fn add_links(&self, count: u64) {
        self.links_enqueued.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the current count for one outcome
    pub fn get(&self, outcome: PageOutcome) -> u64 {
        self.counter(outcome).load(Ordering::Relaxed)
    }

    /// Copies the counters into a statistics value
    pub fn snapshot(&self, started_at: DateTime<Utc>) -> CrawlStatistics {
        CrawlStatistics {
            started_at,
            finished_at: Utc::now(),
            pages_indexed: self.get(PageOutcome::Indexed),
            already_visited: self.get(PageOutcome::AlreadyVisited),
            depth_exceeded: self.get(PageOutcome::DepthExceeded),
            fetch_failures: self.get(PageOutcome::FetchFailed),
            schema_rejections: self.get(PageOutcome::SchemaRejected),
            index_failures: self.get(PageOutcome::IndexFailed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, outcome: PageOutcome) -> &AtomicU64 {
        match outcome {
            PageOutcome::Indexed => &self.indexed,
            PageOutcome::AlreadyVisited => &self.already_visited,
            PageOutcome::DepthExceeded => &self.depth_exceeded,
            PageOutcome::FetchFailed => &self.fetch_failed,
            PageOutcome::SchemaRejected => &self.schema_rejected,
            PageOutcome::IndexFailed => &self.index_failed,
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages the index confirmed storing
    pub pages_indexed: u64,

    /// Items dropped because their URL was already claimed
    pub already_visited: u64,

    /// Items dropped for exceeding the maximum depth
    pub depth_exceeded: u64,

    /// Pages whose fetch failed
    pub fetch_failures: u64,

    /// Pages the index refused
    pub schema_rejections: u64,

    /// Pages whose index write failed and was dropped
    pub index_failures: u64,

    /// Child links pushed onto the frontier
    pub links_enqueued: u64,
}

impl CrawlStatistics {
    /// Returns the count for one outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        match outcome {
            PageOutcome::Indexed => self.pages_indexed,
            PageOutcome::AlreadyVisited => self.already_visited,
            PageOutcome::DepthExceeded => self.depth_exceeded,
            PageOutcome::FetchFailed => self.fetch_failures,
            PageOutcome::SchemaRejected => self.schema_rejections,
            PageOutcome::IndexFailed => self.index_failures,
        }
    }

    /// Total work items dequeued by all workers
    pub fn items_processed(&self) -> u64 {
        PageOutcome::all().iter().map(|o| self.count(*o)).sum()
    }

    /// Pages that were claimed and fetched or attempted
    pub fn pages_attempted(&self) -> u64 {
        PageOutcome::all()
            .iter()
            .filter(|o| !o.is_discard())
            .map(|o| self.count(*o))
            .sum()
    }

    /// Wall-clock crawl duration in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {}s", stats.duration_seconds());
    println!("  Items processed: {}", stats.items_processed());
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!();

    println!("Items by Outcome:");
    let total = stats.items_processed();
    for outcome in PageOutcome::all() {
        let count = stats.count(outcome);
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    let attempted = stats.pages_attempted();
    let success_rate = if attempted > 0 {
        (stats.pages_indexed as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetched pages indexed)",
        success_rate, stats.pages_indexed, attempted
    );
}
