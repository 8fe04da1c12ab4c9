//! Shared world state for annotation submission BDD scenarios.

use std::sync::Arc;

use labelforge::annotation::adapters::memory::InMemoryAnnotationRepository;
use labelforge::annotation::domain::Annotation;
use labelforge::annotation::services::{AnnotationWorkbenchError, AnnotationWorkbenchService};
use labelforge::task::adapters::memory::{InMemoryTaskEventLog, InMemoryTaskRepository};
use labelforge::task::domain::{Task, UserId};
use labelforge::task::services::TaskWorkflowService;
use mockable::DefaultClock;
use rstest::fixture;

/// Workflow service type used by the BDD world.
pub type TestWorkflow =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Workbench service type used by the BDD world.
pub type TestWorkbench = AnnotationWorkbenchService<
    InMemoryAnnotationRepository,
    InMemoryTaskRepository,
    InMemoryTaskEventLog,
    DefaultClock,
>;

/// Scenario world for annotation submission behaviour tests.
pub struct AnnotationWorld {
    pub workflow: TestWorkflow,
    pub workbench: TestWorkbench,
    pub annotator: UserId,
    pub task: Option<Task>,
    pub last_save: Option<Result<Annotation, AnnotationWorkbenchError>>,
}

impl AnnotationWorld {
    /// Creates a world with empty scenario state.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let events = Arc::new(InMemoryTaskEventLog::new());
        let clock = Arc::new(DefaultClock);
        let workflow = TaskWorkflowService::new(
            Arc::clone(&tasks),
            Arc::clone(&events),
            Arc::clone(&clock),
        );
        let workbench = AnnotationWorkbenchService::new(
            Arc::new(InMemoryAnnotationRepository::new()),
            tasks,
            events,
            clock,
        );

        Self {
            workflow,
            workbench,
            annotator: UserId::new(),
            task: None,
            last_save: None,
        }
    }
}

impl Default for AnnotationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> AnnotationWorld {
    AnnotationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
