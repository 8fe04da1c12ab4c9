//! Diesel row types for annotation persistence.

use super::schema::annotations;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Database row representation of an annotation revision.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = annotations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnnotationRow {
    /// Annotation identifier.
    pub id: Uuid,
    /// Task the revision annotates.
    pub task_id: Uuid,
    /// Annotator who produced the revision.
    pub user_id: Uuid,
    /// Kind label naming the annotation tool.
    pub kind: String,
    /// Tool-specific payload.
    pub payload: Value,
    /// Revision number within the `(task, user)` series.
    pub version: i32,
    /// Lifecycle state of the revision.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insertable annotation row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = annotations)]
pub struct NewAnnotationRow {
    /// Annotation identifier.
    pub id: Uuid,
    /// Task the revision annotates.
    pub task_id: Uuid,
    /// Annotator who produced the revision.
    pub user_id: Uuid,
    /// Kind label naming the annotation tool.
    pub kind: String,
    /// Tool-specific payload.
    pub payload: Value,
    /// Revision number within the `(task, user)` series.
    pub version: i32,
    /// Lifecycle state of the revision.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}
