//! In-memory task repository for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AnnotatorLoad, Task, TaskId, TaskStatus, UserId},
    ports::{
        TaskFilter, TaskPage, TaskPageRequest, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Returns `ids` with duplicates removed, keeping first occurrences.
fn dedup_ids(ids: &[TaskId]) -> Vec<TaskId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    if task.project_id() != filter.project_id() {
        return false;
    }
    if filter
        .dataset_id()
        .is_some_and(|dataset_id| task.dataset_id() != dataset_id)
    {
        return false;
    }
    if filter.status().is_some_and(|status| task.status() != status) {
        return false;
    }
    if filter
        .priority()
        .is_some_and(|priority| task.priority() != priority)
    {
        return false;
    }
    if filter
        .assignee()
        .is_some_and(|assignee| task.assignee() != Some(assignee))
    {
        return false;
    }
    true
}

/// Newest-first ordering key matching the listing contract.
fn listing_key(task: &Task) -> (DateTime<Utc>, TaskId) {
    (task.created_at(), task.id())
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store_batch(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;

        let mut batch_ids = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if state.tasks.contains_key(&task.id()) || !batch_ids.insert(task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
        }

        for task in tasks {
            state.tasks.insert(task.id(), task.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let found = dedup_ids(ids)
            .into_iter()
            .filter_map(|id| state.tasks.get(&id).cloned())
            .collect();
        Ok(found)
    }

    async fn list(
        &self,
        filter: TaskFilter,
        page: TaskPageRequest,
    ) -> TaskRepositoryResult<TaskPage> {
        let state = self.state.read().map_err(lock_poisoned)?;

        let cursor_key = match page.after() {
            Some(cursor) => match state.tasks.get(&cursor) {
                Some(task) => Some(listing_key(task)),
                None => {
                    return Ok(TaskPage {
                        tasks: Vec::new(),
                        next_cursor: None,
                    });
                }
            },
            None => None,
        };

        let mut rows: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filter(task, &filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| listing_key(b).cmp(&listing_key(a)));
        if let Some(bound) = cursor_key {
            rows.retain(|task| listing_key(task) < bound);
        }
        rows.truncate(page.limit());

        let next_cursor = if rows.len() == page.limit() {
            rows.last().map(Task::id)
        } else {
            None
        };
        Ok(TaskPage {
            tasks: rows,
            next_cursor,
        })
    }

    async fn update_status_many(
        &self,
        ids: &[TaskId],
        status: TaskStatus,
    ) -> TaskRepositoryResult<Vec<TaskId>> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let mut affected = Vec::new();
        for id in dedup_ids(ids) {
            if let Some(task) = state.tasks.get_mut(&id) {
                task.force_status(status);
                affected.push(id);
            }
        }
        Ok(affected)
    }

    async fn assign_many(
        &self,
        assignments: &[(TaskId, UserId)],
        assigned_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<TaskId>> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let mut affected = Vec::new();
        let mut seen = HashSet::with_capacity(assignments.len());
        for (id, annotator) in assignments.iter().copied() {
            if let Some(task) = state.tasks.get_mut(&id) {
                task.assign(annotator, assigned_at);
                if seen.insert(id) {
                    affected.push(id);
                }
            }
        }
        Ok(affected)
    }

    async fn unassign_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let mut affected = Vec::new();
        for id in dedup_ids(ids) {
            if let Some(task) = state.tasks.get_mut(&id) {
                task.unassign();
                affected.push(id);
            }
        }
        Ok(affected)
    }

    async fn delete_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<TaskId>> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let mut affected = Vec::new();
        for id in dedup_ids(ids) {
            if state.tasks.remove(&id).is_some() {
                affected.push(id);
            }
        }
        Ok(affected)
    }

    async fn count_open_by_assignee(
        &self,
        annotators: &[UserId],
    ) -> TaskRepositoryResult<Vec<AnnotatorLoad>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let pool: HashSet<UserId> = annotators.iter().copied().collect();

        let mut tallies: HashMap<UserId, usize> = HashMap::new();
        for task in state.tasks.values() {
            let open = matches!(
                task.status(),
                TaskStatus::Pending | TaskStatus::InProgress
            );
            if !open {
                continue;
            }
            if let Some(assignee) = task.assignee()
                && pool.contains(&assignee)
            {
                let tally = tallies.entry(assignee).or_insert(0);
                *tally = tally.saturating_add(1);
            }
        }

        // Pool order keeps the result deterministic.
        let loads = annotators
            .iter()
            .copied()
            .filter_map(|annotator| {
                tallies.get(&annotator).map(|open_tasks| AnnotatorLoad {
                    annotator,
                    open_tasks: *open_tasks,
                })
            })
            .collect();
        Ok(loads)
    }
}
