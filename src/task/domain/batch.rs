//! Batch task generation from dataset contents.

use super::{
    DataItemId, DatasetId, NewTaskDetails, ProjectId, Task, TaskDomainError, TaskPriority,
    TaskTitle,
};
use mockable::Clock;
use serde_json::json;

/// Title prefix used when an item batch does not supply one.
const DEFAULT_TITLE_PREFIX: &str = "Task";

/// Request to create one task per dataset item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBatch {
    project_id: ProjectId,
    dataset_id: DatasetId,
    item_ids: Vec<DataItemId>,
    title_prefix: String,
    priority: TaskPriority,
}

impl ItemBatch {
    /// Creates a batch request with the default title prefix and priority.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        dataset_id: DatasetId,
        item_ids: impl IntoIterator<Item = DataItemId>,
    ) -> Self {
        Self {
            project_id,
            dataset_id,
            item_ids: item_ids.into_iter().collect(),
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
            priority: TaskPriority::default(),
        }
    }

    /// Sets the title prefix.
    #[must_use]
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    /// Sets the priority applied to every generated task.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Builds one pending task per item.
    ///
    /// Tasks are titled `"{prefix} #{n}"` with `n` counting from 1 in item
    /// order. An empty item list yields an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a generated title fails validation,
    /// which can only happen with a degenerate prefix.
    pub fn build(&self, clock: &impl Clock) -> Result<Vec<Task>, TaskDomainError> {
        let mut tasks = Vec::with_capacity(self.item_ids.len());
        for (position, item_id) in self.item_ids.iter().copied().enumerate() {
            let title = TaskTitle::new(format!(
                "{} #{}",
                self.title_prefix,
                position.saturating_add(1)
            ))?;
            tasks.push(Task::new(
                NewTaskDetails {
                    project_id: self.project_id,
                    dataset_id: self.dataset_id,
                    data_item_id: item_id,
                    title,
                    priority: self.priority,
                    metadata: None,
                },
                clock,
            ));
        }
        Ok(tasks)
    }
}

/// Request to slice a timed recording into fixed-length annotation tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBatch {
    project_id: ProjectId,
    dataset_id: DatasetId,
    data_item_id: DataItemId,
    total_duration_ms: u64,
    slice_duration_ms: u64,
    priority: TaskPriority,
}

impl SliceBatch {
    /// Creates a slice batch request with the default priority.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        dataset_id: DatasetId,
        data_item_id: DataItemId,
        total_duration_ms: u64,
        slice_duration_ms: u64,
    ) -> Self {
        Self {
            project_id,
            dataset_id,
            data_item_id,
            total_duration_ms,
            slice_duration_ms,
            priority: TaskPriority::default(),
        }
    }

    /// Sets the priority applied to every generated task.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Builds one pending task per time slice.
    ///
    /// Slices cover `[0, total_duration_ms)` in `slice_duration_ms` steps;
    /// the final slice is clamped to the total duration. Each task is titled
    /// `"Slice {n} ({start}-{end}ms)"` and carries `startMs`/`endMs` bounds
    /// in its metadata. A zero total duration yields an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ZeroSliceDuration`] when the slice length
    /// is zero.
    pub fn build(&self, clock: &impl Clock) -> Result<Vec<Task>, TaskDomainError> {
        if self.slice_duration_ms == 0 {
            return Err(TaskDomainError::ZeroSliceDuration);
        }

        let mut tasks = Vec::new();
        let mut start_ms = 0u64;
        let mut ordinal = 1u64;
        while start_ms < self.total_duration_ms {
            let end_ms = start_ms
                .saturating_add(self.slice_duration_ms)
                .min(self.total_duration_ms);
            let title = TaskTitle::new(format!("Slice {ordinal} ({start_ms}-{end_ms}ms)"))?;
            tasks.push(Task::new(
                NewTaskDetails {
                    project_id: self.project_id,
                    dataset_id: self.dataset_id,
                    data_item_id: self.data_item_id,
                    title,
                    priority: self.priority,
                    metadata: Some(json!({ "startMs": start_ms, "endMs": end_ms })),
                },
                clock,
            ));
            start_ms = end_ms;
            ordinal = ordinal.saturating_add(1);
        }
        Ok(tasks)
    }
}
