//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `WorkerState`: The lifecycle of a single crawl worker (waiting, processing, terminated)
//! - `PageOutcome`: What happened to one dequeued work item

mod page_outcome;
mod worker_state;

// Re-export main types
pub use page_outcome::PageOutcome;
pub use worker_state::WorkerState;
