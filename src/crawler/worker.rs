//! Crawl worker loop
//!
//! Each worker repeatedly takes one item from the shared frontier, claims its
//! URL, fetches and parses the page, pushes same-host children back onto the
//! frontier, and submits the page to the index. A worker exits on its own
//! once the frontier stays empty for the idle timeout.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::frontier::{Dequeued, Frontier, VisitedSet, WorkItem};
use crate::crawler::parser::parse_page;
use crate::index::{CrawlDocument, Indexer, Submission};
use crate::output::CrawlCounters;
use crate::state::{PageOutcome, WorkerState};
use crate::url::normalize_link;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Everything the workers of one crawl share
pub struct CrawlContext {
    pub client: Client,
    pub indexer: Arc<dyn Indexer>,
    pub frontier: Frontier,
    pub visited: VisitedSet,
    pub counters: CrawlCounters,
    pub max_depth: u32,
    pub idle_timeout: Duration,
}

/// Per-worker totals, logged when the worker terminates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub items_processed: u64,
    pub pages_indexed: u64,

    /// Items skipped before any network I/O
    pub discarded: u64,

    /// Items that failed after being claimed
    pub failed: u64,
}

/// One of the N concurrent crawl loops
pub struct Worker {
    id: usize,
    context: Arc<CrawlContext>,
    state: WorkerState,
}

impl Worker {
    pub fn new(id: usize, context: Arc<CrawlContext>) -> Self {
        Self {
            id,
            context,
            state: WorkerState::Waiting,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal worker transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Runs until the frontier stays empty for the idle timeout
    pub async fn run(mut self) -> WorkerSummary {
        tracing::info!("Worker {} started", self.id);

        let mut summary = WorkerSummary {
            worker_id: self.id,
            ..WorkerSummary::default()
        };

        while !self.state.is_terminal() {
            match self
                .context
                .frontier
                .dequeue_or_wait(self.context.idle_timeout)
                .await
            {
                Dequeued::Item(item) => {
                    self.transition(WorkerState::Processing);
                    let outcome = self.process(item).await;
                    self.context.counters.record(outcome);

                    summary.items_processed += 1;
                    if outcome.is_success() {
                        summary.pages_indexed += 1;
                    } else if outcome.is_discard() {
                        summary.discarded += 1;
                    } else if outcome.is_error() {
                        summary.failed += 1;
                    }
                    self.transition(WorkerState::Waiting);
                }
                Dequeued::TimedOut => self.transition(WorkerState::Terminated),
            }
        }

        tracing::info!(
            "Worker {} idle for {:?}, terminating: {} items processed, {} pages indexed, {} discarded, {} failed",
            self.id,
            self.context.idle_timeout,
            summary.items_processed,
            summary.pages_indexed,
            summary.discarded,
            summary.failed
        );

        summary
    }

    /// Handles a single work item
    ///
    /// The URL is claimed before the depth check and before any network I/O,
    /// so a failed fetch is never retried by another worker.
    pub async fn process(&self, item: WorkItem) -> PageOutcome {
        let ctx = &self.context;
        let url = item.url.as_str();

        if !ctx.visited.mark_if_absent(url) {
            tracing::debug!("Worker {} skipping {}: already visited", self.id, url);
            return PageOutcome::AlreadyVisited;
        }

        if item.depth > ctx.max_depth {
            tracing::debug!(
                "Worker {} skipping {}: depth {} exceeds {}",
                self.id,
                url,
                item.depth,
                ctx.max_depth
            );
            return PageOutcome::DepthExceeded;
        }

        let body = match fetch_page(&ctx.client, url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Worker {} failed to fetch {}: {}", self.id, url, e);
                return PageOutcome::FetchFailed;
            }
        };
        tracing::info!("Worker {} fetched {} (depth {})", self.id, url, item.depth);

        let page = parse_page(&body);

        let mut enqueued = 0;
        for href in &page.anchors {
            if let Some(link) = normalize_link(&item.url, href) {
                ctx.frontier.enqueue(item.child(link));
                enqueued += 1;
            }
        }
        ctx.counters.add_links(enqueued);
        tracing::debug!(
            "Worker {} enqueued {} of {} links from {}",
            self.id,
            enqueued,
            page.anchors.len(),
            url
        );

        let doc = CrawlDocument::new(url, page.title, page.content);
        match ctx.indexer.index_document(&doc).await {
            Ok(Submission::Stored) => PageOutcome::Indexed,
            Ok(Submission::Dropped) => PageOutcome::IndexFailed,
            Err(_) => PageOutcome::SchemaRejected,
        }
    }
}
