//! Shared crawl frontier and visited set
//!
//! This module handles:
//! - The unbounded multi-producer/multi-consumer queue of work items
//! - Blocking dequeue bounded by an idle timeout
//! - The visited set with atomic test-and-set, the only deduplication point

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

/// A URL waiting to be crawled, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Canonical URL to fetch
    pub url: Url,

    /// Number of link hops from the seed (seed = 0)
    pub depth: u32,
}

impl WorkItem {
    /// Creates the depth-0 item for a seed URL
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Creates the item for a link discovered on this item's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// Result of waiting on the frontier
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued {
    /// An item was available within the timeout
    Item(WorkItem),

    /// Nothing arrived before the timeout elapsed
    TimedOut,
}

/// Frontier queue shared by all workers
///
/// FIFO per enqueue order; with several producers the global order is only
/// approximately breadth-first. There is no capacity limit.
pub struct Frontier {
    sender: UnboundedSender<WorkItem>,

    /// Consumers take turns on the receiver; a waiting worker holds the lock
    /// for at most its idle timeout
    receiver: tokio::sync::Mutex<UnboundedReceiver<WorkItem>>,

    /// Items enqueued but not yet dequeued
    pending: AtomicUsize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            pending: AtomicUsize::new(0),
        }
    }

    /// Adds an item to the back of the queue; never blocks, never fails
    pub fn enqueue(&self, item: WorkItem) {
        // Counted before sending so a fast consumer never sees it go negative.
        // The receiver lives as long as `self`, so the send cannot fail.
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(item).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Waits up to `timeout` for the next item
    ///
    /// # Returns
    ///
    /// * `Dequeued::Item` - The oldest queued item
    /// * `Dequeued::TimedOut` - The frontier stayed empty for `timeout`
    pub async fn dequeue_or_wait(&self, timeout: Duration) -> Dequeued {
        let next = tokio::time::timeout(timeout, async {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        })
        .await;

        match next {
            Ok(Some(item)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                Dequeued::Item(item)
            }
            Ok(None) | Err(_) => Dequeued::TimedOut,
        }
    }

    /// Returns the number of queued items
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

/// Set of canonical URLs that a worker has started processing
///
/// Grows only. A URL is claimed before it is fetched, so a failed fetch is
/// never retried within a run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url`
    ///
    /// Returns true only for the first caller for a given URL.
    pub fn mark_if_absent(&self, url: &str) -> bool {
        match self.urls.lock() {
            Ok(mut urls) => urls.insert(url.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(url.to_string()),
        }
    }

    /// Returns true if `url` has been claimed
    pub fn contains(&self, url: &str) -> bool {
        match self.urls.lock() {
            Ok(urls) => urls.contains(url),
            Err(poisoned) => poisoned.into_inner().contains(url),
        }
    }

    /// Returns the number of claimed URLs
    pub fn len(&self) -> usize {
        match self.urls.lock() {
            Ok(urls) => urls.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns whether no URL has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
