/// Outcome definitions for processed work items
use std::fmt;

/// What a worker did with one dequeued work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched, parsed, and stored by the index
    Indexed,

    // ===== Discards (never fetched) =====
    /// Another worker (or an earlier item) already claimed this URL
    AlreadyVisited,

    /// Item depth is beyond the configured maximum
    DepthExceeded,

    // ===== Failures (page dropped, crawl continues) =====
    /// The fetch timed out or failed; the URL stays visited and is not retried
    FetchFailed,

    /// The index rejected the document against its schema
    SchemaRejected,

    /// The index write failed for another reason and was dropped
    IndexFailed,
}

impl PageOutcome {
    /// Returns true if the page made it into the index
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Indexed)
    }

    /// Returns true if the item was dropped before any network I/O
    pub fn is_discard(&self) -> bool {
        matches!(self, Self::AlreadyVisited | Self::DepthExceeded)
    }

    /// Returns true if the item failed after it was claimed
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::SchemaRejected | Self::IndexFailed
        )
    }

    /// Short machine-friendly label, used in logs and statistics output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::AlreadyVisited => "already_visited",
            Self::DepthExceeded => "depth_exceeded",
            Self::FetchFailed => "fetch_failed",
            Self::SchemaRejected => "schema_rejected",
            Self::IndexFailed => "index_failed",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 6] {
        [
            Self::Indexed,
            Self::AlreadyVisited,
            Self::DepthExceeded,
            Self::FetchFailed,
            Self::SchemaRejected,
            Self::IndexFailed,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
