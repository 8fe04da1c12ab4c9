//! In-memory adapters for task persistence and the audit trail.

mod event_log;
mod task;

pub use event_log::InMemoryTaskEventLog;
pub use task::InMemoryTaskRepository;
