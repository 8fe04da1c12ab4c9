//! Then steps for task review cycle BDD scenarios.

use super::world::{ReviewWorld, run_async};
use eyre::WrapErr;
use labelforge::task::domain::TaskStatus;
use labelforge::task::services::TaskWorkflowError;
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &ReviewWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;

    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let current = run_async(world.workflow.get_task(task_id))
        .wrap_err("reload the scenario task")?
        .ok_or_else(|| eyre::eyre!("the scenario task vanished"))?;

    if current.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            current.status().as_str()
        ));
    }
    Ok(())
}

#[then("the move is recorded in the task history")]
fn move_recorded(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let history = run_async(world.workflow.task_history(task_id))
        .wrap_err("read the scenario task history")?;

    if history.is_empty() {
        return Err(eyre::eyre!("no events recorded for the scenario task"));
    }
    Ok(())
}

#[then("the move is rejected as an invalid transition")]
fn move_rejected_as_invalid_transition(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(result, Err(TaskWorkflowError::TransitionRejected { .. })) {
        return Err(eyre::eyre!("expected TransitionRejected error, got {result:?}"));
    }
    Ok(())
}

#[then("the move is rejected as an unknown status")]
fn move_rejected_as_unknown_status(world: &ReviewWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(result, Err(TaskWorkflowError::Status(_))) {
        return Err(eyre::eyre!("expected unknown status error, got {result:?}"));
    }
    Ok(())
}
