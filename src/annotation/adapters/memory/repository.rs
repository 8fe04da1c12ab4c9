//! In-memory annotation repository for tests and local development.

use crate::annotation::{
    domain::Annotation,
    ports::{AnnotationRepository, AnnotationRepositoryError, AnnotationRepositoryResult},
};
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory annotation repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnnotationRepository {
    rows: Arc<RwLock<Vec<Annotation>>>,
}

impl InMemoryAnnotationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> AnnotationRepositoryError {
    AnnotationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AnnotationRepository for InMemoryAnnotationRepository {
    async fn append(&self, annotation: &Annotation) -> AnnotationRepositoryResult<()> {
        let mut rows = self.rows.write().map_err(lock_poisoned)?;

        let conflict = rows.iter().any(|existing| {
            existing.task_id() == annotation.task_id()
                && existing.user_id() == annotation.user_id()
                && existing.version() == annotation.version()
        });
        if conflict {
            return Err(AnnotationRepositoryError::VersionConflict {
                task_id: annotation.task_id(),
                user_id: annotation.user_id(),
                version: annotation.version(),
            });
        }

        rows.push(annotation.clone());
        Ok(())
    }

    async fn latest(
        &self,
        task_id: TaskId,
        user: Option<UserId>,
    ) -> AnnotationRepositoryResult<Option<Annotation>> {
        let rows = self.rows.read().map_err(lock_poisoned)?;
        let found = rows
            .iter()
            .filter(|row| row.task_id() == task_id)
            .filter(|row| user.is_none_or(|user_id| row.user_id() == user_id))
            .max_by_key(|row| (row.version(), row.updated_at()))
            .cloned();
        Ok(found)
    }

    async fn for_task(&self, task_id: TaskId) -> AnnotationRepositoryResult<Vec<Annotation>> {
        let rows = self.rows.read().map_err(lock_poisoned)?;
        let mut found: Vec<Annotation> = rows
            .iter()
            .filter(|row| row.task_id() == task_id)
            .cloned()
            .collect();
        found.sort_by_key(|row| (row.updated_at(), row.version()));
        Ok(found)
    }
}
