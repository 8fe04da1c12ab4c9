//! `PostgreSQL` event log implementation for the task audit trail.

use super::{
    models::{NewTaskEventRow, TaskEventRow},
    repository::TaskPgPool,
    schema::task_events,
};
use crate::task::{
    domain::{
        PersistedTaskEventData, TaskEvent, TaskEventId, TaskEventKind, TaskId, TaskStatus, UserId,
    },
    ports::{TaskEventLog, TaskEventLogError, TaskEventLogResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed task event log.
///
/// Rows are written without a foreign key to the task table, so deletion
/// events remain readable after the task itself is gone.
#[derive(Debug, Clone)]
pub struct PostgresTaskEventLog {
    pool: TaskPgPool,
}

impl PostgresTaskEventLog {
    /// Creates a new event log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskEventLogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskEventLogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskEventLogError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskEventLogError::persistence)?
    }
}

#[async_trait]
impl TaskEventLog for PostgresTaskEventLog {
    async fn append(&self, events: &[TaskEvent]) -> TaskEventLogResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewTaskEventRow> = events.iter().map(to_new_row).collect();
        self.run_blocking(move |connection| {
            diesel::insert_into(task_events::table)
                .values(&rows)
                .execute(connection)
                .map_err(TaskEventLogError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn for_task(&self, task_id: TaskId) -> TaskEventLogResult<Vec<TaskEvent>> {
        self.run_blocking(move |connection| {
            let rows = task_events::table
                .filter(task_events::task_id.eq(task_id.into_inner()))
                .order((task_events::occurred_at.asc(), task_events::id.asc()))
                .select(TaskEventRow::as_select())
                .load::<TaskEventRow>(connection)
                .map_err(TaskEventLogError::persistence)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }
}

fn to_new_row(event: &TaskEvent) -> NewTaskEventRow {
    NewTaskEventRow {
        id: event.id().into_inner(),
        task_id: event.task_id().into_inner(),
        kind: event.kind().as_str().to_owned(),
        from_status: event.from_status().map(|status| status.as_str().to_owned()),
        to_status: event.to_status().map(|status| status.as_str().to_owned()),
        assignee: event.assignee().map(UserId::into_inner),
        actor: event.actor().map(UserId::into_inner),
        occurred_at: event.occurred_at(),
    }
}

fn row_to_event(row: TaskEventRow) -> TaskEventLogResult<TaskEvent> {
    let TaskEventRow {
        id,
        task_id,
        kind: persisted_kind,
        from_status: persisted_from,
        to_status: persisted_to,
        assignee,
        actor,
        occurred_at,
    } = row;

    let kind =
        TaskEventKind::try_from(persisted_kind.as_str()).map_err(TaskEventLogError::persistence)?;
    let data = PersistedTaskEventData {
        id: TaskEventId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        kind,
        from_status: decode_status(persisted_from)?,
        to_status: decode_status(persisted_to)?,
        assignee: assignee.map(UserId::from_uuid),
        actor: actor.map(UserId::from_uuid),
        occurred_at,
    };
    Ok(TaskEvent::from_persisted(data))
}

fn decode_status(value: Option<String>) -> TaskEventLogResult<Option<TaskStatus>> {
    value
        .map(|status| TaskStatus::try_from(status.as_str()))
        .transpose()
        .map_err(TaskEventLogError::persistence)
}
