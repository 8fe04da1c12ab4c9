//! Then steps for task distribution BDD scenarios.

use super::world::{DistributionWorld, run_async};
use eyre::WrapErr;
use labelforge::task::domain::Task;
use labelforge::task::services::ListTasksRequest;
use rstest_bdd_macros::then;

fn project_tasks(world: &DistributionWorld) -> Result<Vec<Task>, eyre::Report> {
    let project_id = world
        .project
        .ok_or_else(|| eyre::eyre!("missing project in scenario world"))?;
    let page = run_async(
        world
            .workflow
            .list(ListTasksRequest::new(project_id).with_page_size(50)),
    )
    .wrap_err("list the scenario project")?;
    Ok(page.tasks)
}

#[then("{count:usize} tasks are assigned")]
fn tasks_are_assigned(world: &DistributionWorld, count: usize) -> Result<(), eyre::Report> {
    let assigned = world
        .last_count
        .ok_or_else(|| eyre::eyre!("missing assignment count"))?;

    if assigned != count {
        return Err(eyre::eyre!("expected {count} assigned tasks, got {assigned}"));
    }
    Ok(())
}

#[then(r#""{name}" holds {count:usize} of them"#)]
fn annotator_holds(
    world: &DistributionWorld,
    name: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let annotator = world.annotator(&name)?;
    let held = project_tasks(world)?
        .iter()
        .filter(|task| task.assignee() == Some(annotator))
        .count();

    if held != count {
        return Err(eyre::eyre!("expected {name} to hold {count} tasks, found {held}"));
    }
    Ok(())
}

#[then("no task holds an annotator")]
fn no_task_holds_an_annotator(world: &DistributionWorld) -> Result<(), eyre::Report> {
    let lingering = project_tasks(world)?
        .iter()
        .filter(|task| task.assignee().is_some())
        .count();

    if lingering != 0 {
        return Err(eyre::eyre!("{lingering} tasks still hold an annotator"));
    }
    Ok(())
}
