//! Shared helpers for in-memory integration tests.

use std::io;
use std::sync::Arc;

use labelforge::annotation::adapters::memory::InMemoryAnnotationRepository;
use labelforge::annotation::services::AnnotationWorkbenchService;
use labelforge::task::adapters::memory::{InMemoryTaskEventLog, InMemoryTaskRepository};
use labelforge::task::domain::{DataItemId, DatasetId, ProjectId, Task, UserId};
use labelforge::task::services::{
    CreateTasksFromItemsRequest, TaskAssignmentService, TaskWorkflowService,
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::{Builder, Runtime};

/// Workflow service wired to the shared in-memory adapters.
pub type TestWorkflow =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Assignment service wired to the shared in-memory adapters.
pub type TestAssignment =
    TaskAssignmentService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Workbench service wired to the shared in-memory adapters.
pub type TestWorkbench = AnnotationWorkbenchService<
    InMemoryAnnotationRepository,
    InMemoryTaskRepository,
    InMemoryTaskEventLog,
    DefaultClock,
>;

/// The full service stack sharing one set of in-memory adapters.
pub struct Platform {
    pub workflow: TestWorkflow,
    pub assignment: TestAssignment,
    pub workbench: TestWorkbench,
}

/// Creates a current-thread Tokio runtime for driving async operations.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Builds the service stack over fresh shared adapters.
#[fixture]
pub fn platform() -> Platform {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let events = Arc::new(InMemoryTaskEventLog::new());
    let annotations = Arc::new(InMemoryAnnotationRepository::new());
    let clock = Arc::new(DefaultClock);

    Platform {
        workflow: TaskWorkflowService::new(
            Arc::clone(&tasks),
            Arc::clone(&events),
            Arc::clone(&clock),
        ),
        assignment: TaskAssignmentService::new(
            Arc::clone(&tasks),
            Arc::clone(&events),
            Arc::clone(&clock),
        ),
        workbench: AnnotationWorkbenchService::new(annotations, tasks, events, clock),
    }
}

/// Seeds `count` pending tasks into `project_id` and returns them.
///
/// # Panics
///
/// Panics when batch creation fails.
pub async fn seed_project_tasks(
    platform: &Platform,
    project_id: ProjectId,
    count: usize,
) -> Vec<Task> {
    let dataset_id = DatasetId::new();
    let items: Vec<DataItemId> = (0..count).map(|_| DataItemId::new()).collect();
    platform
        .workflow
        .create_from_items(CreateTasksFromItemsRequest::new(
            project_id, dataset_id, items,
        ))
        .await
        .expect("seed tasks")
}

/// Returns a pool of `count` fresh annotator identifiers.
pub fn annotator_pool(count: usize) -> Vec<UserId> {
    (0..count).map(|_| UserId::new()).collect()
}
