//! Event log port for the append-only task audit trail.

use crate::task::domain::{TaskEvent, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event log operations.
pub type TaskEventLogResult<T> = Result<T, TaskEventLogError>;

/// Append-only audit trail contract.
///
/// Events are never updated or removed, and the trail keeps entries for
/// tasks that have since been deleted.
#[async_trait]
pub trait TaskEventLog: Send + Sync {
    /// Appends events to the trail.
    ///
    /// An empty batch is a no-op.
    async fn append(&self, events: &[TaskEvent]) -> TaskEventLogResult<()>;

    /// Returns the recorded trail for one task, oldest first.
    async fn for_task(&self, task_id: TaskId) -> TaskEventLogResult<Vec<TaskEvent>>;
}

/// Errors returned by event log implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskEventLogError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskEventLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
