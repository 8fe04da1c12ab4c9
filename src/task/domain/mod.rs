//! Domain model for task lifecycle and assignment.
//!
//! The task domain models batch task creation from dataset contents, the
//! validated status workflow, annotator assignment, and the append-only
//! audit trail, while keeping all infrastructure concerns outside of the
//! domain boundary.

mod assignment;
mod batch;
mod error;
mod event;
mod ids;
mod status;
mod task;

pub use assignment::{AnnotatorLoad, PlannedAssignment, plan_least_load, plan_round_robin};
pub use batch::{ItemBatch, SliceBatch};
pub use error::{
    ParseTaskEventKindError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use event::{PersistedTaskEventData, TaskEvent, TaskEventKind};
pub use ids::{DataItemId, DatasetId, ProjectId, TaskEventId, TaskId, TaskTitle, UserId};
pub use status::{TaskPriority, TaskStatus};
pub use task::{Assignment, NewTaskDetails, PersistedTaskData, Task};
