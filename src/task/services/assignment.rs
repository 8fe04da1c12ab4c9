//! Service layer for distributing tasks across annotators.

use crate::task::{
    domain::{
        PlannedAssignment, TaskEvent, TaskId, UserId, plan_least_load, plan_round_robin,
    },
    ports::{TaskEventLog, TaskEventLogError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for assigning tasks to a pool of annotators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignTasksRequest {
    task_ids: Vec<TaskId>,
    annotators: Vec<UserId>,
    actor: Option<UserId>,
}

impl AssignTasksRequest {
    /// Creates a request distributing `task_ids` across `annotators`.
    #[must_use]
    pub fn new(
        task_ids: impl IntoIterator<Item = TaskId>,
        annotators: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
            annotators: annotators.into_iter().collect(),
            actor: None,
        }
    }

    /// Records who requested the assignment.
    #[must_use]
    pub const fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Request payload for clearing task assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnassignTasksRequest {
    task_ids: Vec<TaskId>,
    actor: Option<UserId>,
}

impl UnassignTasksRequest {
    /// Creates a request clearing the assignment on every task in
    /// `task_ids`.
    #[must_use]
    pub fn new(task_ids: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
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

/// Service-level errors for task assignment operations.
#[derive(Debug, Error)]
pub enum TaskAssignmentError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Event log operation failed.
    #[error(transparent)]
    EventLog(#[from] TaskEventLogError),
    /// An assignment operation was invoked with no task identifiers.
    #[error("no tasks selected")]
    NoTasksSelected,
    /// An assignment operation was invoked with an empty annotator pool.
    #[error("no annotators supplied")]
    NoAnnotatorsSupplied,
}

/// Result type for task assignment service operations.
pub type TaskAssignmentResult<T> = Result<T, TaskAssignmentError>;

/// Task assignment orchestration service.
///
/// Strategies plan in the domain layer; this service applies the plan,
/// stamps every assignment in a batch with one shared instant, and records
/// an event per task that actually changed.
#[derive(Clone)]
pub struct TaskAssignmentService<R, E, C>
where
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    event_log: Arc<E>,
    clock: Arc<C>,
}

impl<R, E, C> TaskAssignmentService<R, E, C>
where
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    /// Creates a new task assignment service.
    #[must_use]
    pub const fn new(repository: Arc<R>, event_log: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            repository,
            event_log,
            clock,
        }
    }

    /// Distributes tasks across the pool in rotation.
    ///
    /// Returns the number of tasks whose assignment changed. Identifiers
    /// naming missing tasks are planned over but skipped at write time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAssignmentError::NoTasksSelected`] or
    /// [`TaskAssignmentError::NoAnnotatorsSupplied`] for empty inputs, and
    /// propagates persistence failures.
    pub async fn assign_round_robin(
        &self,
        request: AssignTasksRequest,
    ) -> TaskAssignmentResult<usize> {
        let AssignTasksRequest {
            task_ids,
            annotators,
            actor,
        } = request;
        validate_selection(&task_ids, &annotators)?;

        let plan = plan_round_robin(&task_ids, &annotators);
        self.apply_plan(&plan, actor).await
    }

    /// Distributes tasks to whichever annotator holds the fewest open tasks.
    ///
    /// Current open-task tallies are read from the repository before
    /// planning. Returns the number of tasks whose assignment changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAssignmentError::NoTasksSelected`] or
    /// [`TaskAssignmentError::NoAnnotatorsSupplied`] for empty inputs, and
    /// propagates persistence failures.
    pub async fn assign_least_load(
        &self,
        request: AssignTasksRequest,
    ) -> TaskAssignmentResult<usize> {
        let AssignTasksRequest {
            task_ids,
            annotators,
            actor,
        } = request;
        validate_selection(&task_ids, &annotators)?;

        let loads = self.repository.count_open_by_assignee(&annotators).await?;
        let plan = plan_least_load(&task_ids, &annotators, &loads);
        self.apply_plan(&plan, actor).await
    }

    /// Clears the assignment on every selected task.
    ///
    /// Returns the number of existing tasks touched. Each event carries the
    /// annotator the task was taken from, when it held one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskAssignmentError::NoTasksSelected`] for an empty
    /// selection, and propagates persistence failures.
    pub async fn unassign(&self, request: UnassignTasksRequest) -> TaskAssignmentResult<usize> {
        let UnassignTasksRequest { task_ids, actor } = request;
        if task_ids.is_empty() {
            return Err(TaskAssignmentError::NoTasksSelected);
        }

        // Snapshot before the write; the cleared annotators are gone from
        // the store afterwards.
        let existing = self.repository.find_by_ids(&task_ids).await?;
        let previous: HashMap<TaskId, Option<UserId>> = existing
            .iter()
            .map(|task| (task.id(), task.assignee()))
            .collect();

        let affected = self.repository.unassign_many(&task_ids).await?;
        let events: Vec<TaskEvent> = affected
            .iter()
            .map(|task_id| {
                let prior = previous.get(task_id).copied().flatten();
                TaskEvent::unassigned(*task_id, prior, actor, &*self.clock)
            })
            .collect();
        self.event_log.append(&events).await?;

        info!("unassigned {} tasks", affected.len());
        Ok(affected.len())
    }

    async fn apply_plan(
        &self,
        plan: &[PlannedAssignment],
        actor: Option<UserId>,
    ) -> TaskAssignmentResult<usize> {
        let pairs: Vec<(TaskId, UserId)> = plan
            .iter()
            .map(|planned| (planned.task_id, planned.annotator))
            .collect();
        let assigned_at = self.clock.utc();
        let affected = self.repository.assign_many(&pairs, assigned_at).await?;

        // A task named twice in the plan lands with the later annotator, so
        // its event must report that one.
        let mut final_assignee: HashMap<TaskId, UserId> = HashMap::with_capacity(plan.len());
        for planned in plan {
            final_assignee.insert(planned.task_id, planned.annotator);
        }
        let events: Vec<TaskEvent> = affected
            .iter()
            .filter_map(|task_id| {
                final_assignee.get(task_id).map(|annotator| {
                    TaskEvent::assigned(*task_id, *annotator, actor, &*self.clock)
                })
            })
            .collect();
        self.event_log.append(&events).await?;

        info!("assigned {} tasks", affected.len());
        Ok(affected.len())
    }
}

const fn validate_selection(task_ids: &[TaskId], annotators: &[UserId]) -> TaskAssignmentResult<()> {
    if task_ids.is_empty() {
        return Err(TaskAssignmentError::NoTasksSelected);
    }
    if annotators.is_empty() {
        return Err(TaskAssignmentError::NoAnnotatorsSupplied);
    }
    Ok(())
}
