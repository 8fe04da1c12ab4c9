//! Service layer for capturing annotation revisions.

use crate::annotation::{
    domain::{
        Annotation, AnnotationDomainError, AnnotationKind, AnnotationStatus, AnnotationVersion,
        NewAnnotationRecord, ParseSaveModeError, SaveMode,
    },
    ports::{AnnotationRepository, AnnotationRepositoryError},
};
use crate::task::{
    domain::{Task, TaskEvent, TaskId, TaskStatus, UserId},
    ports::{TaskEventLog, TaskEventLogError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for saving one annotation revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAnnotationRequest {
    task_id: TaskId,
    user_id: UserId,
    kind: String,
    payload: Value,
}

impl SaveAnnotationRequest {
    /// Creates a request recording `user_id`'s work on `task_id`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        user_id: UserId,
        kind: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            task_id,
            user_id,
            kind: kind.into(),
            payload,
        }
    }
}

/// Service-level errors for annotation workbench operations.
#[derive(Debug, Error)]
pub enum AnnotationWorkbenchError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AnnotationDomainError),
    /// The requested save mode is not recognized.
    #[error(transparent)]
    Mode(#[from] ParseSaveModeError),
    /// Annotation persistence failed.
    #[error(transparent)]
    Annotations(#[from] AnnotationRepositoryError),
    /// Task lookup or status write failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
    /// Event log operation failed.
    #[error(transparent)]
    EventLog(#[from] TaskEventLogError),
}

/// Result type for annotation workbench service operations.
pub type AnnotationWorkbenchResult<T> = Result<T, AnnotationWorkbenchError>;

/// Annotation capture orchestration service.
///
/// Every save appends a fresh revision; nothing is updated in place. The
/// version counter is read from the store at save time, so two annotators
/// never share a series and one annotator's series never skips.
#[derive(Clone)]
pub struct AnnotationWorkbenchService<A, R, E, C>
where
    A: AnnotationRepository,
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    annotations: Arc<A>,
    tasks: Arc<R>,
    event_log: Arc<E>,
    clock: Arc<C>,
}

impl<A, R, E, C> AnnotationWorkbenchService<A, R, E, C>
where
    A: AnnotationRepository,
    R: TaskRepository,
    E: TaskEventLog,
    C: Clock + Send + Sync,
{
    /// Creates a new annotation workbench service.
    #[must_use]
    pub const fn new(
        annotations: Arc<A>,
        tasks: Arc<R>,
        event_log: Arc<E>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            annotations,
            tasks,
            event_log,
            clock,
        }
    }

    /// Saves a revision in the mode named by request text.
    ///
    /// `"draft"` and `"save"` record a revision and leave the task alone;
    /// `"submit"` additionally parks the task for review. Matching is
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError::Mode`] for unrecognized mode
    /// text, and otherwise fails as the selected operation does.
    pub async fn save_in_mode(
        &self,
        request: SaveAnnotationRequest,
        mode: &str,
    ) -> AnnotationWorkbenchResult<Annotation> {
        match SaveMode::try_from(mode)? {
            SaveMode::Draft => self.save_draft(request).await,
            SaveMode::Save => self.save(request).await,
            SaveMode::Submit => self.submit(request).await,
        }
    }

    /// Saves a draft revision, leaving the task's status untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError`] when the kind is empty, the task
    /// does not exist, or persistence fails.
    pub async fn save_draft(
        &self,
        request: SaveAnnotationRequest,
    ) -> AnnotationWorkbenchResult<Annotation> {
        self.save_with_status(request, AnnotationStatus::Draft).await
    }

    /// Saves a kept revision, leaving the task's status untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError`] when the kind is empty, the task
    /// does not exist, or persistence fails.
    pub async fn save(
        &self,
        request: SaveAnnotationRequest,
    ) -> AnnotationWorkbenchResult<Annotation> {
        self.save_with_status(request, AnnotationStatus::Saved).await
    }

    /// Saves a submitted revision and parks the task for review.
    ///
    /// The task moves to [`TaskStatus::ToReview`] no matter where it sits in
    /// the workflow, without consulting the transition table. A status event
    /// is recorded only when the task was not already under review.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError`] when the kind is empty, the task
    /// does not exist, or persistence fails.
    pub async fn submit(
        &self,
        request: SaveAnnotationRequest,
    ) -> AnnotationWorkbenchResult<Annotation> {
        let SaveAnnotationRequest {
            task_id,
            user_id,
            kind: raw_kind,
            payload,
        } = request;
        let kind = AnnotationKind::new(raw_kind)?;
        let task = self.require_task(task_id).await?;

        let annotation = self
            .append_revision(task_id, user_id, kind, payload, AnnotationStatus::Submitted)
            .await?;

        let prior = task.status();
        let affected = self
            .tasks
            .update_status_many(&[task_id], TaskStatus::ToReview)
            .await?;
        if prior != TaskStatus::ToReview && !affected.is_empty() {
            let event = TaskEvent::status_changed(
                task_id,
                prior,
                TaskStatus::ToReview,
                Some(user_id),
                &*self.clock,
            );
            self.event_log.append(&[event]).await?;
        }

        info!("annotation submitted for task {task_id}, parked for review");
        Ok(annotation)
    }

    /// Returns the latest revision for a task.
    ///
    /// With `user` set, only that annotator's revisions are considered.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError::Annotations`] when the lookup
    /// fails.
    pub async fn latest(
        &self,
        task_id: TaskId,
        user: Option<UserId>,
    ) -> AnnotationWorkbenchResult<Option<Annotation>> {
        Ok(self.annotations.latest(task_id, user).await?)
    }

    /// Returns every revision recorded for a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationWorkbenchError::Annotations`] when the lookup
    /// fails.
    pub async fn history(&self, task_id: TaskId) -> AnnotationWorkbenchResult<Vec<Annotation>> {
        Ok(self.annotations.for_task(task_id).await?)
    }

    async fn save_with_status(
        &self,
        request: SaveAnnotationRequest,
        status: AnnotationStatus,
    ) -> AnnotationWorkbenchResult<Annotation> {
        let SaveAnnotationRequest {
            task_id,
            user_id,
            kind: raw_kind,
            payload,
        } = request;
        let kind = AnnotationKind::new(raw_kind)?;
        self.require_task(task_id).await?;
        self.append_revision(task_id, user_id, kind, payload, status)
            .await
    }

    async fn require_task(&self, task_id: TaskId) -> AnnotationWorkbenchResult<Task> {
        Ok(self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskRepositoryError::NotFound(task_id))?)
    }

    async fn append_revision(
        &self,
        task_id: TaskId,
        user_id: UserId,
        kind: AnnotationKind,
        payload: Value,
        status: AnnotationStatus,
    ) -> AnnotationWorkbenchResult<Annotation> {
        let first_attempt = self
            .next_revision(task_id, user_id, kind.clone(), payload.clone(), status)
            .await?;
        match self.annotations.append(&first_attempt).await {
            Ok(()) => Ok(first_attempt),
            Err(AnnotationRepositoryError::VersionConflict { .. }) => {
                // Lost a version race to a concurrent save. Re-read the head
                // and retry once; a second conflict propagates.
                debug!("version conflict on task {task_id} for user {user_id}, retrying");
                let retry = self
                    .next_revision(task_id, user_id, kind, payload, status)
                    .await?;
                self.annotations.append(&retry).await?;
                Ok(retry)
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn next_revision(
        &self,
        task_id: TaskId,
        user_id: UserId,
        kind: AnnotationKind,
        payload: Value,
        status: AnnotationStatus,
    ) -> AnnotationWorkbenchResult<Annotation> {
        let version = self
            .annotations
            .latest(task_id, Some(user_id))
            .await?
            .map_or(AnnotationVersion::FIRST, |head| head.version().next());
        Ok(Annotation::new(
            NewAnnotationRecord {
                task_id,
                user_id,
                kind,
                payload,
                version,
                status,
            },
            &*self.clock,
        ))
    }
}
