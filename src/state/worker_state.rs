use std::fmt;

/// Lifecycle of a crawl worker
///
/// ```text
/// Waiting ──item──▶ Processing ──done──▶ Waiting
///    │
///    └──idle timeout──▶ Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Blocked on the frontier, bounded by the idle timeout
    Waiting,

    /// Handling one dequeued work item
    Processing,

    /// Exited after an idle timeout; final
    Terminated,
}

impl WorkerState {
    /// Returns true if `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Processing)
                | (Self::Waiting, Self::Terminated)
                | (Self::Processing, Self::Waiting)
        )
    }

    /// Returns true once the worker has exited
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Processing => "processing",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
