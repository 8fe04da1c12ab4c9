//! Diesel row models for task and event trail persistence.

use super::schema::{task_events, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Source dataset.
    pub dataset_id: uuid::Uuid,
    /// Dataset item the task annotates.
    pub data_item_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Workflow status.
    pub status: String,
    /// Scheduling priority.
    pub priority: String,
    /// Assigned annotator, when assigned.
    pub assigned_to: Option<uuid::Uuid>,
    /// Assignment instant, when assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Creation metadata payload.
    pub metadata: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Source dataset.
    pub dataset_id: uuid::Uuid,
    /// Dataset item the task annotates.
    pub data_item_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Workflow status.
    pub status: String,
    /// Scheduling priority.
    pub priority: String,
    /// Assigned annotator, when assigned.
    pub assigned_to: Option<uuid::Uuid>,
    /// Assignment instant, when assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Creation metadata payload.
    pub metadata: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for task events.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub kind: String,
    /// Status before the change, for status events.
    pub from_status: Option<String>,
    /// Status after the change, for status events.
    pub to_status: Option<String>,
    /// Affected annotator, for assignment events.
    pub assignee: Option<uuid::Uuid>,
    /// User who performed the mutation, when known.
    pub actor: Option<uuid::Uuid>,
    /// Occurrence timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Insert model for task events.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_events)]
pub struct NewTaskEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub task_id: uuid::Uuid,
    /// Event kind.
    pub kind: String,
    /// Status before the change, for status events.
    pub from_status: Option<String>,
    /// Status after the change, for status events.
    pub to_status: Option<String>,
    /// Affected annotator, for assignment events.
    pub assignee: Option<uuid::Uuid>,
    /// User who performed the mutation, when known.
    pub actor: Option<uuid::Uuid>,
    /// Occurrence timestamp.
    pub occurred_at: DateTime<Utc>,
}
