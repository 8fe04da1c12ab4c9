//! Service layer for task creation, listing, status changes, deletion, and
//! export.

use crate::export;
use crate::task::{
    domain::{
        DataItemId, DatasetId, ItemBatch, ParseTaskPriorityError, ParseTaskStatusError, ProjectId,
        SliceBatch, Task, TaskDomainError, TaskEvent, TaskId, TaskPriority, TaskStatus, UserId,
    },
    ports::{
        TaskEventLog, TaskEventLogError, TaskFilter, TaskPage, TaskPageRequest, TaskRepository,
        TaskRepositoryError,
    },
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Page size applied when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Largest page size a listing request may name.
pub const MAX_PAGE_SIZE: usize = 200;

/// Request payload for creating one task per dataset item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTasksFromItemsRequest {
    project_id: ProjectId,
    dataset_id: DatasetId,
    item_ids: Vec<DataItemId>,
    title_prefix: Option<String>,
    priority: Option<String>,
}

impl CreateTasksFromItemsRequest {
    /// Creates a request covering the given dataset items.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        dataset_id: DatasetId,
        item_ids: impl IntoIterator<Item = DataItemId>,
    ) -> Self {
        Self {
            project_id,
            dataset_id,
            item_ids: item_ids.into_iter().collect(),
            title_prefix: None,
            priority: None,
        }
    }

    /// Sets the title prefix for generated tasks.
    #[must_use]
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    /// Sets the priority for generated tasks.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// Request payload for slicing a timed recording into tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTasksFromTimeSlicesRequest {
    project_id: ProjectId,
    dataset_id: DatasetId,
    data_item_id: DataItemId,
    total_duration_ms: u64,
    slice_duration_ms: u64,
    priority: Option<String>,
}

impl CreateTasksFromTimeSlicesRequest {
    /// Creates a request slicing `total_duration_ms` of material into
    /// `slice_duration_ms` windows.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        dataset_id: DatasetId,
        data_item_id: DataItemId,
        total_duration_ms: u64,
        slice_duration_ms: u64,
    ) -> Self {
        Self {
            project_id,
            dataset_id,
            data_item_id,
            total_duration_ms,
            slice_duration_ms,
            priority: None,
        }
    }

    /// Sets the priority for generated tasks.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// Request payload for listing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksRequest {
    project_id: ProjectId,
    dataset_id: Option<DatasetId>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<UserId>,
    page_size: Option<usize>,
    cursor: Option<TaskId>,
}

impl ListTasksRequest {
    /// Creates a request listing every task in `project_id`.
    #[must_use]
    pub const fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            dataset_id: None,
            status: None,
            priority: None,
            assignee: None,
            page_size: None,
            cursor: None,
        }
    }

    /// Narrows the listing to one dataset.
    #[must_use]
    pub const fn with_dataset(mut self, dataset_id: DatasetId) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }

    /// Narrows the listing to one workflow status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Narrows the listing to one priority band.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Narrows the listing to one annotator's tasks.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Resumes listing after the given cursor task.
    #[must_use]
    pub const fn with_cursor(mut self, cursor: TaskId) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Request payload for exporting tasks as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTasksRequest {
    project_id: ProjectId,
    dataset_id: Option<DatasetId>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<UserId>,
}

impl ExportTasksRequest {
    /// Creates a request exporting every task in `project_id`.
    #[must_use]
    pub const fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            dataset_id: None,
            status: None,
            priority: None,
            assignee: None,
        }
    }

    /// Narrows the export to one dataset.
    #[must_use]
    pub const fn with_dataset(mut self, dataset_id: DatasetId) -> Self {
        self.dataset_id = Some(dataset_id);
        self
    }

    /// Narrows the export to one workflow status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Narrows the export to one priority band.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Narrows the export to one annotator's tasks.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }
}

/// Request payload for a single-task status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTaskStatusRequest {
    task_id: TaskId,
    target: String,
    actor: Option<UserId>,
}

impl ChangeTaskStatusRequest {
    /// Creates a request moving `task_id` to `target`.
    #[must_use]
    pub fn new(task_id: TaskId, target: impl Into<String>) -> Self {
        Self {
            task_id,
            target: target.into(),
            actor: None,
        }
    }

    /// Records who requested the change.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Request payload for a bulk status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkChangeStatusRequest {
    task_ids: Vec<TaskId>,
    target: String,
    actor: Option<UserId>,
}

impl BulkChangeStatusRequest {
    /// Creates a request moving every task in `task_ids` to `target`.
    #[must_use]
    pub fn new(task_ids: impl IntoIterator<Item = TaskId>, target: impl Into<String>) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
            target: target.into(),
            actor: None,
        }
    }

    /// Records who requested the change.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Request payload for deleting tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTasksRequest {
    task_ids: Vec<TaskId>,
    actor: Option<UserId>,
}

impl DeleteTasksRequest {
    /// Creates a request deleting every task in `task_ids`.
    #[must_use]
    pub fn new(task_ids: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
            actor: None,
        }
    }

    /// Records who requested the deletion.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Service-level errors for task workflow operations.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The requested status is not recognized.
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
    /// The requested priority is not recognized.
    #[error(transparent)]
    Priority(#[from] ParseTaskPriorityError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Event log operation failed.
    #[error(transparent)]
    EventLog(#[from] TaskEventLogError),
    /// A bulk operation was invoked with no task identifiers.
    #[error("no tasks selected")]
    NoTasksSelected,
    /// A bulk operation named tasks that do not exist.
    #[error("only {found} of {requested} selected tasks exist")]
    TasksNotFound {
        /// Number of distinct tasks named by the request.
        requested: usize,
        /// Number of those tasks that exist.
        found: usize,
    },
    /// A task's current status does not allow the requested transition.
    #[error("task {task_id} cannot make the requested transition")]
    TransitionRejected {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Domain error describing the rejected transition.
        #[source]
        source: TaskDomainError,
    },
    /// The requested page size is zero or above the maximum.
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),
}

/// Result type for task workflow service operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;

/// Task workflow orchestration service.
///
/// Every mutation that touches stored tasks appends matching entries to the
/// event log.
#[derive(Clone)]
pub struct TaskWorkflowService<R, E, C>
where
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    event_log: Arc<E>,
    clock: Arc<C>,
}

impl<R, E, C> TaskWorkflowService<R, E, C>
where
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    /// Creates a new task workflow service.
    #[must_use]
    pub const fn new(repository: Arc<R>, event_log: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            repository,
            event_log,
            clock,
        }
    }

    /// Creates one pending task per dataset item and stores the batch.
    ///
    /// An empty item list succeeds without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the priority does not parse, title
    /// generation fails, or the repository rejects the batch.
    pub async fn create_from_items(
        &self,
        request: CreateTasksFromItemsRequest,
    ) -> TaskWorkflowResult<Vec<Task>> {
        let CreateTasksFromItemsRequest {
            project_id,
            dataset_id,
            item_ids,
            title_prefix,
            priority: requested_priority,
        } = request;

        let priority = parse_priority(requested_priority)?;
        let mut batch = ItemBatch::new(project_id, dataset_id, item_ids).with_priority(priority);
        if let Some(prefix) = title_prefix {
            batch = batch.with_title_prefix(prefix);
        }

        let tasks = batch.build(&*self.clock)?;
        if tasks.is_empty() {
            return Ok(tasks);
        }
        self.repository.store_batch(&tasks).await?;
        info!("created {} tasks for project {}", tasks.len(), project_id);
        Ok(tasks)
    }

    /// Slices a timed recording into fixed-length tasks and stores the batch.
    ///
    /// A zero total duration succeeds without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the priority does not parse, the
    /// slice length is zero, or the repository rejects the batch.
    pub async fn create_from_time_slices(
        &self,
        request: CreateTasksFromTimeSlicesRequest,
    ) -> TaskWorkflowResult<Vec<Task>> {
        let CreateTasksFromTimeSlicesRequest {
            project_id,
            dataset_id,
            data_item_id,
            total_duration_ms,
            slice_duration_ms,
            priority: requested_priority,
        } = request;

        let priority = parse_priority(requested_priority)?;
        let batch = SliceBatch::new(
            project_id,
            dataset_id,
            data_item_id,
            total_duration_ms,
            slice_duration_ms,
        )
        .with_priority(priority);

        let tasks = batch.build(&*self.clock)?;
        if tasks.is_empty() {
            return Ok(tasks);
        }
        self.repository.store_batch(&tasks).await?;
        info!("created {} slice tasks for item {}", tasks.len(), data_item_id);
        Ok(tasks)
    }

    /// Lists tasks newest-first under the request's filter criteria.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::InvalidPageSize`] when the page size is
    /// zero or above [`MAX_PAGE_SIZE`], and propagates status parse and
    /// repository failures.
    pub async fn list(&self, request: ListTasksRequest) -> TaskWorkflowResult<TaskPage> {
        let ListTasksRequest {
            project_id,
            dataset_id,
            status,
            priority,
            assignee,
            page_size,
            cursor,
        } = request;

        let limit = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(TaskWorkflowError::InvalidPageSize(limit));
        }

        let filter = build_filter(project_id, dataset_id, status, priority, assignee)?;
        let mut page = TaskPageRequest::new(limit);
        if let Some(after) = cursor {
            page = page.with_after(after);
        }
        Ok(self.repository.list(filter, page).await?)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when the lookup fails.
    pub async fn get_task(&self, id: TaskId) -> TaskWorkflowResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Returns the recorded audit trail for one task, oldest first.
    ///
    /// The trail remains readable after the task has been deleted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::EventLog`] when the lookup fails.
    pub async fn task_history(&self, id: TaskId) -> TaskWorkflowResult<Vec<TaskEvent>> {
        Ok(self.event_log.for_task(id).await?)
    }

    /// Returns the statuses reachable from `status`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Status`] when `status` does not parse.
    #[expect(
        clippy::unused_self,
        reason = "status queries sit on the service next to the mutations that apply them"
    )]
    pub fn allowed_transitions(&self, status: &str) -> TaskWorkflowResult<&'static [TaskStatus]> {
        let parsed = TaskStatus::try_from(status)?;
        Ok(parsed.allowed_transitions())
    }

    /// Moves one task to a new status and records the change.
    ///
    /// Returns the task with its updated status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::TransitionRejected`] when the transition
    /// table forbids the change, [`TaskRepositoryError::NotFound`] when the
    /// task does not exist, and propagates parse and persistence failures.
    pub async fn change_status(&self, request: ChangeTaskStatusRequest) -> TaskWorkflowResult<Task> {
        let ChangeTaskStatusRequest {
            task_id,
            target: requested,
            actor,
        } = request;

        let target = TaskStatus::try_from(requested.as_str())?;
        let mut task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskRepositoryError::NotFound(task_id))?;

        let from = task.status();
        task.transition_to(target)
            .map_err(|source| TaskWorkflowError::TransitionRejected {
                task_id: task.id(),
                source,
            })?;

        let affected = self
            .repository
            .update_status_many(&[task.id()], target)
            .await?;
        if affected.is_empty() {
            return Err(TaskRepositoryError::NotFound(task.id()).into());
        }

        let event = TaskEvent::status_changed(task.id(), from, target, actor, &*self.clock);
        self.event_log.append(&[event]).await?;
        debug!("task {} moved from {} to {}", task.id(), from, target);
        Ok(task)
    }

    /// Moves a set of tasks to a new status and records one event per task.
    ///
    /// The whole selection is validated before anything is written: every
    /// named task must exist and every one must be able to make the
    /// transition. Returns the number of tasks updated.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NoTasksSelected`] for an empty selection,
    /// [`TaskWorkflowError::TasksNotFound`] when identifiers are missing,
    /// [`TaskWorkflowError::TransitionRejected`] on the first task that
    /// cannot move, and propagates parse and persistence failures.
    pub async fn bulk_change_status(
        &self,
        request: BulkChangeStatusRequest,
    ) -> TaskWorkflowResult<usize> {
        let BulkChangeStatusRequest {
            task_ids,
            target: requested,
            actor,
        } = request;

        if task_ids.is_empty() {
            return Err(TaskWorkflowError::NoTasksSelected);
        }
        let target = TaskStatus::try_from(requested.as_str())?;

        let mut tasks = self.repository.find_by_ids(&task_ids).await?;
        let distinct: HashSet<TaskId> = task_ids.iter().copied().collect();
        if tasks.len() != distinct.len() {
            return Err(TaskWorkflowError::TasksNotFound {
                requested: distinct.len(),
                found: tasks.len(),
            });
        }

        let mut priors = Vec::with_capacity(tasks.len());
        for task in &mut tasks {
            let from = task.status();
            task.transition_to(target)
                .map_err(|source| TaskWorkflowError::TransitionRejected {
                    task_id: task.id(),
                    source,
                })?;
            priors.push((task.id(), from));
        }

        let ids: Vec<TaskId> = tasks.iter().map(Task::id).collect();
        let affected = self.repository.update_status_many(&ids, target).await?;
        let affected_ids: HashSet<TaskId> = affected.iter().copied().collect();

        let events: Vec<TaskEvent> = priors
            .iter()
            .filter(|(id, _)| affected_ids.contains(id))
            .map(|(id, from)| TaskEvent::status_changed(*id, *from, target, actor, &*self.clock))
            .collect();
        self.event_log.append(&events).await?;

        info!("moved {} tasks to {}", affected.len(), target);
        Ok(affected.len())
    }

    /// Deletes a set of tasks, recording one deletion event per task.
    ///
    /// Identifiers naming missing tasks are skipped. Returns the number of
    /// tasks removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when persistence or the event log
    /// fails.
    pub async fn delete(&self, request: DeleteTasksRequest) -> TaskWorkflowResult<usize> {
        let DeleteTasksRequest { task_ids, actor } = request;

        if task_ids.is_empty() {
            return Ok(0);
        }
        let existing = self.repository.find_by_ids(&task_ids).await?;
        if existing.is_empty() {
            return Ok(0);
        }
        let ids: Vec<TaskId> = existing.iter().map(Task::id).collect();

        // Events go in first; the trail must outlive the rows it describes.
        let events: Vec<TaskEvent> = ids
            .iter()
            .map(|id| TaskEvent::deleted(*id, actor, &*self.clock))
            .collect();
        self.event_log.append(&events).await?;

        let removed = self.repository.delete_many(&ids).await?;
        info!("deleted {} tasks", removed.len());
        Ok(removed.len())
    }

    /// Exports every task matching the request as a CSV document.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when the status filter does not parse
    /// or the repository fails.
    pub async fn export_csv(&self, request: ExportTasksRequest) -> TaskWorkflowResult<String> {
        let ExportTasksRequest {
            project_id,
            dataset_id,
            status,
            priority,
            assignee,
        } = request;

        let filter = build_filter(project_id, dataset_id, status, priority, assignee)?;
        let mut collected = Vec::new();
        let mut page = TaskPageRequest::new(MAX_PAGE_SIZE);
        loop {
            let TaskPage { tasks, next_cursor } = self.repository.list(filter, page).await?;
            collected.extend(tasks);
            match next_cursor {
                Some(cursor) => page = TaskPageRequest::new(MAX_PAGE_SIZE).with_after(cursor),
                None => break,
            }
        }

        debug!("exporting {} tasks as csv", collected.len());
        Ok(export::render_tasks_csv(&collected))
    }
}

fn parse_priority(value: Option<String>) -> Result<TaskPriority, ParseTaskPriorityError> {
    value.map_or(Ok(TaskPriority::default()), |raw| {
        TaskPriority::try_from(raw.as_str())
    })
}

fn build_filter(
    project_id: ProjectId,
    dataset: Option<DatasetId>,
    status: Option<String>,
    priority: Option<String>,
    assignee: Option<UserId>,
) -> TaskWorkflowResult<TaskFilter> {
    let mut filter = TaskFilter::for_project(project_id);
    if let Some(dataset_id) = dataset {
        filter = filter.with_dataset(dataset_id);
    }
    if let Some(raw) = status {
        filter = filter.with_status(TaskStatus::try_from(raw.as_str())?);
    }
    if let Some(raw) = priority {
        filter = filter.with_priority(TaskPriority::try_from(raw.as_str())?);
    }
    if let Some(annotator) = assignee {
        filter = filter.with_assignee(annotator);
    }
    Ok(filter)
}
