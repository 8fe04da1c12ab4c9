//! Task aggregate root and assignment value type.

use super::{
    DataItemId, DatasetId, ProjectId, TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskTitle,
    UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Link between a task and the annotator currently holding it.
///
/// The assignee and the assignment instant always travel together: a task
/// either has both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    assignee: UserId,
    assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates an assignment record.
    #[must_use]
    pub const fn new(assignee: UserId, assigned_at: DateTime<Utc>) -> Self {
        Self {
            assignee,
            assigned_at,
        }
    }

    /// Returns the assigned annotator.
    #[must_use]
    pub const fn assignee(&self) -> UserId {
        self.assignee
    }

    /// Returns when the assignment was made.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}

/// Parameter object for constructing a new task.
#[derive(Debug, Clone)]
pub struct NewTaskDetails {
    /// Project the task belongs to.
    pub project_id: ProjectId,
    /// Dataset the task draws its item from.
    pub dataset_id: DatasetId,
    /// Dataset item the task annotates.
    pub data_item_id: DataItemId,
    /// Validated task title.
    pub title: TaskTitle,
    /// Scheduling priority.
    pub priority: TaskPriority,
    /// Optional structured payload attached at creation time.
    pub metadata: Option<Value>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    dataset_id: DatasetId,
    data_item_id: DataItemId,
    title: TaskTitle,
    status: TaskStatus,
    priority: TaskPriority,
    assignment: Option<Assignment>,
    metadata: Option<Value>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning project.
    pub project_id: ProjectId,
    /// Persisted source dataset.
    pub dataset_id: DatasetId,
    /// Persisted dataset item.
    pub data_item_id: DataItemId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted workflow status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted assignment, if any.
    pub assignment: Option<Assignment>,
    /// Persisted creation metadata, if any.
    pub metadata: Option<Value>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new unassigned task in [`TaskStatus::Pending`].
    #[must_use]
    pub fn new(details: NewTaskDetails, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            project_id: details.project_id,
            dataset_id: details.dataset_id,
            data_item_id: details.data_item_id,
            title: details.title,
            status: TaskStatus::Pending,
            priority: details.priority,
            assignment: None,
            metadata: details.metadata,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            dataset_id: data.dataset_id,
            data_item_id: data.data_item_id,
            title: data.title,
            status: data.status,
            priority: data.priority,
            assignment: data.assignment,
            metadata: data.metadata,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the source dataset.
    #[must_use]
    pub const fn dataset_id(&self) -> DatasetId {
        self.dataset_id
    }

    /// Returns the dataset item the task annotates.
    #[must_use]
    pub const fn data_item_id(&self) -> DataItemId {
        self.data_item_id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the current assignment, if any.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Returns the assigned annotator, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<UserId> {
        self.assignment.map(|assignment| assignment.assignee())
    }

    /// Returns the creation metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves the task to `target` if the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusTransition`] when the change
    /// is not in the transition table.
    pub fn transition_to(&mut self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStatusTransition {
                from: self.status.as_str().to_owned(),
                to: target.as_str().to_owned(),
            });
        }

        self.status = target;
        Ok(())
    }

    /// Sets the status without consulting the transition table.
    ///
    /// Annotation submission parks the task for review regardless of where
    /// it currently sits in the workflow. Returns the status the task held
    /// before the override.
    pub const fn force_status(&mut self, target: TaskStatus) -> TaskStatus {
        let previous = self.status;
        self.status = target;
        previous
    }

    /// Assigns the task to `assignee`, replacing any existing assignment.
    ///
    /// The timestamp is supplied by the caller so that every task in a batch
    /// shares a single assignment instant.
    pub const fn assign(&mut self, assignee: UserId, assigned_at: DateTime<Utc>) {
        self.assignment = Some(Assignment::new(assignee, assigned_at));
    }

    /// Clears the assignment and returns what was cleared, if anything.
    pub const fn unassign(&mut self) -> Option<Assignment> {
        self.assignment.take()
    }
}
