//! `PostgreSQL` persistence adapters for the task context.

mod event_log;
mod models;
mod repository;
mod schema;

pub use event_log::PostgresTaskEventLog;
pub use repository::{PostgresTaskRepository, TaskPgPool};
