//! Crawler module for fetching pages and walking a site
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded connect timeout
//! - HTML parsing for the title and anchors
//! - The shared frontier queue and visited set
//! - The worker loop and the coordinator that runs the pool

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use coordinator::{run_crawl, run_crawl_with_config, Coordinator};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use frontier::{Dequeued, Frontier, VisitedSet, WorkItem};
pub use parser::{parse_page, ParsedPage};
pub use worker::{CrawlContext, Worker, WorkerSummary};
