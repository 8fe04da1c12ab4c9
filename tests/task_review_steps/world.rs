//! Shared world state for task review cycle BDD scenarios.

use std::sync::Arc;

use labelforge::task::adapters::memory::{InMemoryTaskEventLog, InMemoryTaskRepository};
use labelforge::task::domain::Task;
use labelforge::task::services::{TaskWorkflowError, TaskWorkflowService};
use mockable::DefaultClock;
use rstest::fixture;

/// Workflow service type used by the BDD world.
pub type TestWorkflow =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Scenario world for review cycle behaviour tests.
pub struct ReviewWorld {
    pub workflow: TestWorkflow,
    pub task: Option<Task>,
    pub last_move: Option<Result<Task, TaskWorkflowError>>,
}

impl ReviewWorld {
    /// Creates a world with empty scenario state.
    #[must_use]
    pub fn new() -> Self {
        let workflow = TaskWorkflowService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryTaskEventLog::new()),
            Arc::new(DefaultClock),
        );

        Self {
            workflow,
            task: None,
            last_move: None,
        }
    }
}

impl Default for ReviewWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReviewWorld {
    ReviewWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
