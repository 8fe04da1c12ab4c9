//! Append-only audit events for task mutations.

use super::{ParseTaskEventKindError, TaskEventId, TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEventKind {
    /// The task moved to a different workflow status.
    StatusChanged,
    /// The task was assigned to an annotator.
    Assigned,
    /// The task's assignment was cleared.
    Unassigned,
    /// The task row was removed.
    Deleted,
}

impl TaskEventKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusChanged => "STATUS_CHANGED",
            Self::Assigned => "ASSIGNED",
            Self::Unassigned => "UNASSIGNED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for TaskEventKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskEventKind {
    type Error = ParseTaskEventKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "STATUS_CHANGED" => Ok(Self::StatusChanged),
            "ASSIGNED" => Ok(Self::Assigned),
            "UNASSIGNED" => Ok(Self::Unassigned),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(ParseTaskEventKindError(value.to_owned())),
        }
    }
}

/// Immutable record of a single task mutation.
///
/// Events reference tasks by identifier only, so the trail survives task
/// deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    id: TaskEventId,
    task_id: TaskId,
    kind: TaskEventKind,
    from_status: Option<TaskStatus>,
    to_status: Option<TaskStatus>,
    assignee: Option<UserId>,
    actor: Option<UserId>,
    occurred_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedTaskEventData {
    /// Persisted event identifier.
    pub id: TaskEventId,
    /// Persisted parent task identifier.
    pub task_id: TaskId,
    /// Persisted event kind.
    pub kind: TaskEventKind,
    /// Persisted originating status, if any.
    pub from_status: Option<TaskStatus>,
    /// Persisted resulting status, if any.
    pub to_status: Option<TaskStatus>,
    /// Persisted affected annotator, if any.
    pub assignee: Option<UserId>,
    /// Persisted acting user, if any.
    pub actor: Option<UserId>,
    /// Persisted occurrence timestamp.
    pub occurred_at: DateTime<Utc>,
}

impl TaskEvent {
    /// Records a validated or forced status change.
    #[must_use]
    pub fn status_changed(
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        actor: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::StatusChanged,
            from_status: Some(from),
            to_status: Some(to),
            assignee: None,
            actor,
            occurred_at: clock.utc(),
        }
    }

    /// Records an assignment to `assignee`.
    #[must_use]
    pub fn assigned(
        task_id: TaskId,
        assignee: UserId,
        actor: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Assigned,
            from_status: None,
            to_status: None,
            assignee: Some(assignee),
            actor,
            occurred_at: clock.utc(),
        }
    }

    /// Records the removal of an assignment.
    ///
    /// `previous_assignee` is the annotator the task was taken from, when
    /// known.
    #[must_use]
    pub fn unassigned(
        task_id: TaskId,
        previous_assignee: Option<UserId>,
        actor: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Unassigned,
            from_status: None,
            to_status: None,
            assignee: previous_assignee,
            actor,
            occurred_at: clock.utc(),
        }
    }

    /// Records the deletion of a task.
    #[must_use]
    pub fn deleted(task_id: TaskId, actor: Option<UserId>, clock: &impl Clock) -> Self {
        Self {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Deleted,
            from_status: None,
            to_status: None,
            assignee: None,
            actor,
            occurred_at: clock.utc(),
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedTaskEventData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            kind: data.kind,
            from_status: data.from_status,
            to_status: data.to_status,
            assignee: data.assignee,
            actor: data.actor,
            occurred_at: data.occurred_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> TaskEventId {
        self.id
    }

    /// Returns the parent task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> TaskEventKind {
        self.kind
    }

    /// Returns the status the task held before the change, if recorded.
    #[must_use]
    pub const fn from_status(&self) -> Option<TaskStatus> {
        self.from_status
    }

    /// Returns the status the task moved to, if recorded.
    #[must_use]
    pub const fn to_status(&self) -> Option<TaskStatus> {
        self.to_status
    }

    /// Returns the annotator affected by an assignment change, if recorded.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the user who performed the mutation, if recorded.
    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    /// Returns when the mutation occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
