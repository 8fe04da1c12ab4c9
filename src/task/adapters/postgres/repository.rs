//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        AnnotatorLoad, Assignment, DataItemId, DatasetId, PersistedTaskData, ProjectId, Task,
        TaskId, TaskPriority, TaskStatus, TaskTitle, UserId,
    },
    ports::{
        TaskFilter, TaskPage, TaskPageRequest, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use std::collections::HashSet;

/// `PostgreSQL` connection pool type used by labelforge adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store_batch(&self, batch: &[Task]) -> TaskRepositoryResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut batch_ids = HashSet::with_capacity(batch.len());
        for task in batch {
            if !batch_ids.insert(task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
        }

        let ids: Vec<uuid::Uuid> = batch.iter().map(|task| task.id().into_inner()).collect();
        let rows: Vec<NewTaskRow> = batch.iter().map(to_new_row).collect();

        self.run_blocking(move |connection| {
            // The pre-check improves semantic error reporting but is not
            // relied on for correctness: the primary key still enforces
            // integrity in the window between check and insert.
            let existing = tasks::table
                .filter(tasks::id.eq_any(ids))
                .select(tasks::id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            if let Some(duplicate) = existing {
                return Err(TaskRepositoryError::DuplicateTask(TaskId::from_uuid(
                    duplicate,
                )));
            }

            diesel::insert_into(tasks::table)
                .values(&rows)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::id.eq_any(uuids))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list(
        &self,
        filter: TaskFilter,
        page: TaskPageRequest,
    ) -> TaskRepositoryResult<TaskPage> {
        let limit = i64::try_from(page.limit()).map_err(TaskRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let cursor_key = match page.after() {
                Some(cursor) => {
                    let found = tasks::table
                        .filter(tasks::id.eq(cursor.into_inner()))
                        .select((tasks::created_at, tasks::id))
                        .first::<(DateTime<Utc>, uuid::Uuid)>(connection)
                        .optional()
                        .map_err(TaskRepositoryError::persistence)?;
                    match found {
                        Some(key) => Some(key),
                        None => {
                            return Ok(TaskPage {
                                tasks: Vec::new(),
                                next_cursor: None,
                            });
                        }
                    }
                }
                None => None,
            };

            let mut query = tasks::table
                .select(TaskRow::as_select())
                .into_boxed()
                .filter(tasks::project_id.eq(filter.project_id().into_inner()));
            if let Some(dataset_id) = filter.dataset_id() {
                query = query.filter(tasks::dataset_id.eq(dataset_id.into_inner()));
            }
            if let Some(status) = filter.status() {
                query = query.filter(tasks::status.eq(status.as_str()));
            }
            if let Some(priority) = filter.priority() {
                query = query.filter(tasks::priority.eq(priority.as_str()));
            }
            if let Some(assignee) = filter.assignee() {
                query = query.filter(tasks::assigned_to.eq(Some(assignee.into_inner())));
            }
            if let Some((cursor_created_at, cursor_id)) = cursor_key {
                query = query.filter(
                    tasks::created_at.lt(cursor_created_at).or(tasks::created_at
                        .eq(cursor_created_at)
                        .and(tasks::id.lt(cursor_id))),
                );
            }

            let rows = query
                .order((tasks::created_at.desc(), tasks::id.desc()))
                .limit(limit)
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let listed: Vec<Task> = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<_>>()?;

            let next_cursor = if listed.len() == page.limit() {
                listed.last().map(Task::id)
            } else {
                None
            };
            Ok(TaskPage {
                tasks: listed,
                next_cursor,
            })
        })
        .await
    }

    async fn update_status_many(
        &self,
        ids: &[TaskId],
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<TaskId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq_any(uuids)))
                .set(tasks::status.eq(status.as_str()))
                .returning(tasks::id)
                .get_results::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(updated.into_iter().map(TaskId::from_uuid).collect())
        })
        .await
    }

    async fn assign_many(
        &self,
        assignments: &[(TaskId, UserId)],
        assigned_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<TaskId>> {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        // One UPDATE per annotator, grouped in first-appearance order.
        let mut groups: Vec<(uuid::Uuid, Vec<uuid::Uuid>)> = Vec::new();
        for (task_id, annotator) in assignments.iter().copied() {
            let annotator_id = annotator.into_inner();
            if let Some((_, group)) = groups
                .iter_mut()
                .find(|(existing, _)| *existing == annotator_id)
            {
                group.push(task_id.into_inner());
            } else {
                groups.push((annotator_id, vec![task_id.into_inner()]));
            }
        }

        self.run_blocking(move |connection| {
            let updated = connection
                .transaction::<Vec<uuid::Uuid>, DieselError, _>(|txn| {
                    let mut affected = Vec::new();
                    for (annotator_id, group) in groups {
                        let rows = diesel::update(tasks::table.filter(tasks::id.eq_any(group)))
                            .set((
                                tasks::assigned_to.eq(Some(annotator_id)),
                                tasks::assigned_at.eq(Some(assigned_at)),
                            ))
                            .returning(tasks::id)
                            .get_results::<uuid::Uuid>(txn)?;
                        affected.extend(rows);
                    }
                    Ok(affected)
                })
                .map_err(TaskRepositoryError::persistence)?;

            let mut seen = HashSet::with_capacity(updated.len());
            Ok(updated
                .into_iter()
                .map(TaskId::from_uuid)
                .filter(|id| seen.insert(*id))
                .collect())
        })
        .await
    }

    async fn unassign_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq_any(uuids)))
                .set((
                    tasks::assigned_to.eq(None::<uuid::Uuid>),
                    tasks::assigned_at.eq(None::<DateTime<Utc>>),
                ))
                .returning(tasks::id)
                .get_results::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(updated.into_iter().map(TaskId::from_uuid).collect())
        })
        .await
    }

    async fn delete_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let removed = diesel::delete(tasks::table.filter(tasks::id.eq_any(uuids)))
                .returning(tasks::id)
                .get_results::<uuid::Uuid>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(removed.into_iter().map(TaskId::from_uuid).collect())
        })
        .await
    }

    async fn count_open_by_assignee(
        &self,
        annotators: &[UserId],
    ) -> TaskRepositoryResult<Vec<AnnotatorLoad>> {
        if annotators.is_empty() {
            return Ok(Vec::new());
        }
        let pool: Vec<Option<uuid::Uuid>> = annotators
            .iter()
            .map(|annotator| Some(annotator.into_inner()))
            .collect();
        self.run_blocking(move |connection| {
            let counts = tasks::table
                .filter(tasks::assigned_to.eq_any(pool))
                .filter(tasks::status.eq_any([
                    TaskStatus::Pending.as_str(),
                    TaskStatus::InProgress.as_str(),
                ]))
                .group_by(tasks::assigned_to)
                .select((tasks::assigned_to, diesel::dsl::count_star()))
                .load::<(Option<uuid::Uuid>, i64)>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            let mut loads = Vec::with_capacity(counts.len());
            for (assignee, tally) in counts {
                let Some(annotator) = assignee else { continue };
                let open_tasks =
                    usize::try_from(tally).map_err(TaskRepositoryError::persistence)?;
                loads.push(AnnotatorLoad {
                    annotator: UserId::from_uuid(annotator),
                    open_tasks,
                });
            }
            Ok(loads)
        })
        .await
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        dataset_id: task.dataset_id().into_inner(),
        data_item_id: task.data_item_id().into_inner(),
        title: task.title().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        assigned_to: task.assignee().map(UserId::into_inner),
        assigned_at: task.assignment().map(Assignment::assigned_at),
        metadata: task.metadata().cloned(),
        created_at: task.created_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        dataset_id,
        data_item_id,
        title: persisted_title,
        status: persisted_status,
        priority: persisted_priority,
        assigned_to,
        assigned_at,
        metadata,
        created_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let assignment = decode_assignment(TaskId::from_uuid(id), assigned_to, assigned_at)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        dataset_id: DatasetId::from_uuid(dataset_id),
        data_item_id: DataItemId::from_uuid(data_item_id),
        title,
        status,
        priority,
        assignment,
        metadata,
        created_at,
    };
    Ok(Task::from_persisted(data))
}

/// Decodes the assignment column pair, rejecting half-set rows.
fn decode_assignment(
    task_id: TaskId,
    assigned_to: Option<uuid::Uuid>,
    assigned_at: Option<DateTime<Utc>>,
) -> TaskRepositoryResult<Option<Assignment>> {
    match (assigned_to, assigned_at) {
        (Some(assignee), Some(at)) => Ok(Some(Assignment::new(UserId::from_uuid(assignee), at))),
        (None, None) => Ok(None),
        _ => Err(TaskRepositoryError::persistence(std::io::Error::other(
            format!("task {task_id} has a half-set assignment pair"),
        ))),
    }
}
