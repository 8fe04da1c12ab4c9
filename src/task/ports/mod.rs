//! Port contracts for task lifecycle and assignment.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod event_log;
pub mod repository;

pub use event_log::{TaskEventLog, TaskEventLogError, TaskEventLogResult};
pub use repository::{
    TaskFilter, TaskPage, TaskPageRequest, TaskRepository, TaskRepositoryError,
    TaskRepositoryResult,
};
