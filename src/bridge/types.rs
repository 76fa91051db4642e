//! Error and status types for the async bridge.

use thiserror::Error;

/// Identifier of a task owned by a [`Scheduler`](super::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable lifecycle of a task, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Spawned but not polled yet.
    Pending,
    /// Waiting on exactly one outstanding operation.
    Suspended,
    /// Completed successfully.
    Done,
    /// Completed with an error.
    Failed,
}

/// Failures raised by the bridge itself rather than by awaited operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("operation was dropped without delivering a result")]
    Abandoned,

    #[error("host event loop stopped before the task completed")]
    LoopExhausted,

    #[error("no completion registered for operation '{0}'")]
    NoCompletion(&'static str),

    #[error("operation '{operation}' expected a '{expected}' completion but received '{received}'")]
    UnexpectedCompletion {
        operation: &'static str,
        expected: &'static str,
        received: &'static str,
    },
}
