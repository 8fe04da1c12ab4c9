//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested status change is not in the transition table.
    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Status the task currently holds.
        from: String,
        /// Status the change requested.
        to: String,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the persisted column width.
    #[error("task title is {0} characters, the maximum is 255")]
    TitleTooLong(usize),

    /// Time-slice task generation was asked for zero-length slices.
    #[error("slice duration must be a positive number of milliseconds")]
    ZeroSliceDuration,
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing task event kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task event kind: {0}")]
pub struct ParseTaskEventKindError(pub String);
