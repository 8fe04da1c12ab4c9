//! `PostgreSQL` repository implementation for annotation storage.

use super::{
    models::{AnnotationRow, NewAnnotationRow},
    schema::annotations,
};
use crate::annotation::{
    domain::{
        Annotation, AnnotationId, AnnotationKind, AnnotationStatus, AnnotationVersion,
        PersistedAnnotationData,
    },
    ports::{AnnotationRepository, AnnotationRepositoryError, AnnotationRepositoryResult},
};
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Name of the unique index serializing concurrent version writes.
const VERSION_INDEX: &str = "idx_annotations_version_unique";

/// `PostgreSQL` connection pool type used by annotation adapters.
pub type AnnotationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed annotation repository.
#[derive(Debug, Clone)]
pub struct PostgresAnnotationRepository {
    pool: AnnotationPgPool,
}

impl PostgresAnnotationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AnnotationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AnnotationRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AnnotationRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AnnotationRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AnnotationRepositoryError::persistence)?
    }
}

#[async_trait]
impl AnnotationRepository for PostgresAnnotationRepository {
    async fn append(&self, annotation: &Annotation) -> AnnotationRepositoryResult<()> {
        let row = to_new_row(annotation);
        let task_id = annotation.task_id();
        let user_id = annotation.user_id();
        let version = annotation.version();

        self.run_blocking(move |connection| {
            diesel::insert_into(annotations::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some(VERSION_INDEX) =>
                    {
                        AnnotationRepositoryError::VersionConflict {
                            task_id,
                            user_id,
                            version,
                        }
                    }
                    other => AnnotationRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn latest(
        &self,
        task_id: TaskId,
        user: Option<UserId>,
    ) -> AnnotationRepositoryResult<Option<Annotation>> {
        self.run_blocking(move |connection| {
            let mut query = annotations::table
                .select(AnnotationRow::as_select())
                .into_boxed()
                .filter(annotations::task_id.eq(task_id.into_inner()));
            if let Some(user_id) = user {
                query = query.filter(annotations::user_id.eq(user_id.into_inner()));
            }

            let row = query
                .order((
                    annotations::version.desc(),
                    annotations::updated_at.desc(),
                ))
                .first::<AnnotationRow>(connection)
                .optional()
                .map_err(AnnotationRepositoryError::persistence)?;
            row.map(row_to_annotation).transpose()
        })
        .await
    }

    async fn for_task(&self, task_id: TaskId) -> AnnotationRepositoryResult<Vec<Annotation>> {
        self.run_blocking(move |connection| {
            let rows = annotations::table
                .filter(annotations::task_id.eq(task_id.into_inner()))
                .order((annotations::updated_at.asc(), annotations::version.asc()))
                .select(AnnotationRow::as_select())
                .load::<AnnotationRow>(connection)
                .map_err(AnnotationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_annotation).collect()
        })
        .await
    }
}

fn to_new_row(annotation: &Annotation) -> NewAnnotationRow {
    NewAnnotationRow {
        id: annotation.id().into_inner(),
        task_id: annotation.task_id().into_inner(),
        user_id: annotation.user_id().into_inner(),
        kind: annotation.kind().as_str().to_owned(),
        payload: annotation.payload().clone(),
        version: i32::try_from(annotation.version().value()).unwrap_or(i32::MAX),
        status: annotation.status().as_str().to_owned(),
        created_at: annotation.created_at(),
        updated_at: annotation.updated_at(),
    }
}

fn row_to_annotation(row: AnnotationRow) -> AnnotationRepositoryResult<Annotation> {
    let AnnotationRow {
        id,
        task_id,
        user_id,
        kind: persisted_kind,
        payload,
        version: persisted_version,
        status: persisted_status,
        created_at,
        updated_at,
    } = row;

    let kind =
        AnnotationKind::new(persisted_kind).map_err(AnnotationRepositoryError::persistence)?;
    let raw_version =
        u32::try_from(persisted_version).map_err(AnnotationRepositoryError::persistence)?;
    let version =
        AnnotationVersion::new(raw_version).map_err(AnnotationRepositoryError::persistence)?;
    let status = AnnotationStatus::try_from(persisted_status.as_str())
        .map_err(AnnotationRepositoryError::persistence)?;

    Ok(Annotation::from_persisted(PersistedAnnotationData {
        id: AnnotationId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        user_id: UserId::from_uuid(user_id),
        kind,
        payload,
        version,
        status,
        created_at,
        updated_at,
    }))
}
