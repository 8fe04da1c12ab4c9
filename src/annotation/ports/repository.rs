//! Repository port for append-only annotation persistence.

use crate::annotation::domain::{Annotation, AnnotationVersion};
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for annotation repository operations.
pub type AnnotationRepositoryResult<T> = Result<T, AnnotationRepositoryError>;

/// Annotation persistence contract.
///
/// Rows are only ever appended. The `(task, user, version)` triple is
/// unique; concurrent writers racing for the same version lose with
/// [`AnnotationRepositoryError::VersionConflict`].
#[async_trait]
pub trait AnnotationRepository: Send + Sync {
    /// Appends one annotation revision.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationRepositoryError::VersionConflict`] when the
    /// revision's `(task, user, version)` triple already exists.
    async fn append(&self, annotation: &Annotation) -> AnnotationRepositoryResult<()>;

    /// Returns the latest revision for a task.
    ///
    /// With `user` set, only that annotator's revisions are considered.
    /// Latest means highest version; equal versions are broken by the most
    /// recent update timestamp.
    async fn latest(
        &self,
        task_id: TaskId,
        user: Option<UserId>,
    ) -> AnnotationRepositoryResult<Option<Annotation>>;

    /// Returns every revision recorded for a task, oldest first.
    async fn for_task(&self, task_id: TaskId) -> AnnotationRepositoryResult<Vec<Annotation>>;
}

/// Errors returned by annotation repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AnnotationRepositoryError {
    /// The revision's `(task, user, version)` triple already exists.
    #[error("annotation version {version} already exists for task {task_id} and user {user_id}")]
    VersionConflict {
        /// Task the rejected revision annotates.
        task_id: TaskId,
        /// Annotator who wrote the rejected revision.
        user_id: UserId,
        /// Version the rejected revision carried.
        version: AnnotationVersion,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AnnotationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
