//! Given steps for annotation submission BDD scenarios.

use super::world::{AnnotationWorld, run_async};
use eyre::WrapErr;
use labelforge::task::domain::{DataItemId, DatasetId, ProjectId};
use labelforge::task::services::CreateTasksFromItemsRequest;
use rstest_bdd_macros::given;

#[given("a pending task with an annotator at work")]
fn pending_task_with_annotator(world: &mut AnnotationWorld) -> Result<(), eyre::Report> {
    let request = CreateTasksFromItemsRequest::new(
        ProjectId::new(),
        DatasetId::new(),
        [DataItemId::new()],
    );
    let mut created = run_async(world.workflow.create_from_items(request))
        .wrap_err("create the scenario task")?;
    world.task = created.pop();
    Ok(())
}
