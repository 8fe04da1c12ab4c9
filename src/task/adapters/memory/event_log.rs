//! In-memory event log for tests and local development.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{TaskEvent, TaskId},
    ports::{TaskEventLog, TaskEventLogError, TaskEventLogResult},
};

/// Thread-safe in-memory event log.
///
/// Events are held in append order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskEventLog {
    events: Arc<RwLock<Vec<TaskEvent>>>,
}

impl InMemoryTaskEventLog {
    /// Creates an empty in-memory event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TaskEventLogError {
    TaskEventLogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskEventLog for InMemoryTaskEventLog {
    async fn append(&self, events: &[TaskEvent]) -> TaskEventLogResult<()> {
        let mut trail = self.events.write().map_err(lock_poisoned)?;
        trail.extend_from_slice(events);
        Ok(())
    }

    async fn for_task(&self, task_id: TaskId) -> TaskEventLogResult<Vec<TaskEvent>> {
        let trail = self.events.read().map_err(lock_poisoned)?;
        Ok(trail
            .iter()
            .filter(|event| event.task_id() == task_id)
            .copied()
            .collect())
    }
}
