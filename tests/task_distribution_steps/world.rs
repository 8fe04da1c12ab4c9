//! Shared world state for task distribution BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use labelforge::task::adapters::memory::{InMemoryTaskEventLog, InMemoryTaskRepository};
use labelforge::task::domain::{ProjectId, TaskId, UserId};
use labelforge::task::services::{TaskAssignmentService, TaskWorkflowService};
use mockable::DefaultClock;
use rstest::fixture;

/// Workflow service type used by the BDD world.
pub type TestWorkflow =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Assignment service type used by the BDD world.
pub type TestAssignment =
    TaskAssignmentService<InMemoryTaskRepository, InMemoryTaskEventLog, DefaultClock>;

/// Scenario world for distribution behaviour tests.
pub struct DistributionWorld {
    pub workflow: TestWorkflow,
    pub assignment: TestAssignment,
    pub project: Option<ProjectId>,
    pub batch: Vec<TaskId>,
    pub users: HashMap<String, UserId>,
    pub pool: Vec<UserId>,
    pub last_count: Option<usize>,
}

impl DistributionWorld {
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
        let assignment = TaskAssignmentService::new(tasks, events, clock);

        Self {
            workflow,
            assignment,
            project: None,
            batch: Vec::new(),
            users: HashMap::new(),
            pool: Vec::new(),
            last_count: None,
        }
    }

    /// Looks up an annotator registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario never introduced `name`.
    pub fn annotator(&self, name: &str) -> Result<UserId, eyre::Report> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown annotator {name} in scenario world"))
    }
}

impl Default for DistributionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DistributionWorld {
    DistributionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
