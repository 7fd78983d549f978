//! Output module for crawl statistics
//!
//! This module handles:
//! - Recording per-outcome counters while workers run
//! - Snapshotting them into a summary when the crawl ends
//! - Printing the summary for the CLI

pub mod stats;

pub use stats::{print_statistics, CrawlCounters, CrawlStatistics};
