//! Annotation aggregate and its validated value types.

use super::{AnnotationDomainError, AnnotationId, AnnotationStatus};
use crate::task::domain::{TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Label naming what sort of annotation a revision holds.
///
/// Kinds are free-form tool identifiers such as `"bbox"` or
/// `"transcript"`; the only rule is that they are non-empty after
/// trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationKind(String);

impl AnnotationKind {
    /// Validates and trims a kind label.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationDomainError::EmptyKind`] when `value` is empty or
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, AnnotationDomainError> {
        let normalized = value.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(AnnotationDomainError::EmptyKind);
        }
        Ok(Self(normalized))
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AnnotationKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Revision number of one annotator's work on one task.
///
/// Versions start at [`Self::FIRST`] and grow strictly by one per kept
/// revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnnotationVersion(u32);

impl AnnotationVersion {
    /// Version carried by the first revision.
    pub const FIRST: Self = Self(1);

    /// Creates a version from a raw revision number.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationDomainError::InvalidVersion`] when `value` is
    /// zero or does not fit the persisted integer column.
    pub fn new(value: u32) -> Result<Self, AnnotationDomainError> {
        if value == 0 || i32::try_from(value).is_err() {
            return Err(AnnotationDomainError::InvalidVersion(value));
        }
        Ok(Self(value))
    }

    /// Returns the next version in sequence, saturating at the storable
    /// maximum.
    #[must_use]
    pub fn next(self) -> Self {
        Self::new(self.0.saturating_add(1)).unwrap_or(self)
    }

    /// Returns the raw revision number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AnnotationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameter object for constructing a new annotation revision.
#[derive(Debug, Clone)]
pub struct NewAnnotationRecord {
    /// Task the revision annotates.
    pub task_id: TaskId,
    /// Annotator who produced the revision.
    pub user_id: UserId,
    /// Kind of annotation held.
    pub kind: AnnotationKind,
    /// Tool-specific annotation payload.
    pub payload: Value,
    /// Revision number within the `(task, user)` series.
    pub version: AnnotationVersion,
    /// Lifecycle state of the revision.
    pub status: AnnotationStatus,
}

/// One immutable annotation revision.
///
/// Revisions are append-only: saving again writes a new row with the next
/// version rather than updating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    task_id: TaskId,
    user_id: UserId,
    kind: AnnotationKind,
    payload: Value,
    version: AnnotationVersion,
    status: AnnotationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAnnotationData {
    /// Persisted annotation identifier.
    pub id: AnnotationId,
    /// Persisted parent task.
    pub task_id: TaskId,
    /// Persisted annotator.
    pub user_id: UserId,
    /// Persisted kind label.
    pub kind: AnnotationKind,
    /// Persisted payload.
    pub payload: Value,
    /// Persisted revision number.
    pub version: AnnotationVersion,
    /// Persisted lifecycle state.
    pub status: AnnotationStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Annotation {
    /// Creates a new annotation revision stamped with the current time.
    #[must_use]
    pub fn new(record: NewAnnotationRecord, clock: &impl Clock) -> Self {
        let now = clock.utc();
        Self {
            id: AnnotationId::new(),
            task_id: record.task_id,
            user_id: record.user_id,
            kind: record.kind,
            payload: record.payload,
            version: record.version,
            status: record.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs an annotation from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAnnotationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            user_id: data.user_id,
            kind: data.kind,
            payload: data.payload,
            version: data.version,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the annotation identifier.
    #[must_use]
    pub const fn id(&self) -> AnnotationId {
        self.id
    }

    /// Returns the parent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the annotator.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the kind label.
    #[must_use]
    pub const fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    /// Returns the annotation payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the revision number.
    #[must_use]
    pub const fn version(&self) -> AnnotationVersion {
        self.version
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> AnnotationStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
