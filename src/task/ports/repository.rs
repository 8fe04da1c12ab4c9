//! Repository port for task persistence, lookup, and set-level mutation.

use crate::task::domain::{
    AnnotatorLoad, DatasetId, ProjectId, Task, TaskId, TaskPriority, TaskStatus, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Filter applied when listing or exporting tasks.
///
/// Listing is always scoped to one project; the remaining criteria narrow
/// the result further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    project_id: ProjectId,
    dataset_id: Option<DatasetId>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    assignee: Option<UserId>,
}

impl TaskFilter {
    /// Creates a filter matching every task in `project_id`.
    #[must_use]
    pub const fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id,
            dataset_id: None,
            status: None,
            priority: None,
            assignee: None,
        }
    }

    /// Narrows the filter to one dataset.
    #[must_use]
    pub const fn with_dataset(mut self, dataset_id: DatasetId) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }

    /// Narrows the filter to one workflow status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Narrows the filter to one priority band.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Narrows the filter to tasks assigned to one annotator.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Returns the project scope.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the dataset criterion, if set.
    #[must_use]
    pub const fn dataset_id(&self) -> Option<DatasetId> {
        self.dataset_id
    }

    /// Returns the status criterion, if set.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the priority criterion, if set.
    #[must_use]
    pub const fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    /// Returns the assignee criterion, if set.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }
}

/// Page request for task listing.
///
/// The limit is validated by the service layer before it reaches an
/// adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPageRequest {
    limit: usize,
    after: Option<TaskId>,
}

impl TaskPageRequest {
    /// Creates a request for the first page.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit, after: None }
    }

    /// Resumes listing after the given cursor task.
    #[must_use]
    pub const fn with_after(mut self, cursor: TaskId) -> Self {
        self.after = Some(cursor);
        self
    }

    /// Returns the maximum number of tasks to return.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the cursor task, if any.
    #[must_use]
    pub const fn after(&self) -> Option<TaskId> {
        self.after
    }
}

/// One page of listing results, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks ordered by creation time descending, ties broken by id
    /// descending.
    pub tasks: Vec<Task>,
    /// Cursor for the next page, present when more results may follow.
    pub next_cursor: Option<TaskId>,
}

/// Task persistence contract.
///
/// Adapters never validate workflow rules: they write whatever state the
/// caller hands them. Status validation lives in the domain and is applied
/// by services before a write.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a batch of new tasks atomically.
    ///
    /// An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when a task identifier
    /// already exists (or repeats within the batch), leaving the store
    /// unchanged.
    async fn store_batch(&self, tasks: &[Task]) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching `ids`, in no particular order.
    ///
    /// Missing identifiers are skipped; duplicates yield one task.
    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>>;

    /// Lists tasks newest-first under `filter` with keyset pagination.
    ///
    /// A cursor naming a task that no longer exists yields an empty page.
    async fn list(&self, filter: TaskFilter, page: TaskPageRequest)
    -> TaskRepositoryResult<TaskPage>;

    /// Sets `status` on every task in `ids`, bypassing no validation.
    ///
    /// Returns the identifiers of tasks actually updated; missing ids are
    /// skipped.
    async fn update_status_many(
        &self,
        ids: &[TaskId],
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<TaskId>>;

    /// Applies planned assignments, stamping each with `assigned_at`.
    ///
    /// Existing assignments are replaced. Returns the identifiers of tasks
    /// actually updated; missing ids are skipped.
    async fn assign_many(
        &self,
        assignments: &[(TaskId, UserId)],
        assigned_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<TaskId>>;

    /// Clears the assignment on every task in `ids`.
    ///
    /// Returns every existing task in `ids`, whether or not it held an
    /// assignment.
    async fn unassign_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>>;

    /// Deletes the tasks in `ids`.
    ///
    /// Returns the identifiers of tasks actually removed; missing ids are
    /// skipped.
    async fn delete_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>>;

    /// Tallies open (pending or in-progress) tasks per annotator in the
    /// pool.
    ///
    /// Annotators holding no open tasks may be omitted from the result.
    async fn count_open_by_assignee(
        &self,
        annotators: &[UserId],
    ) -> TaskRepositoryResult<Vec<AnnotatorLoad>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
