//! Then steps for annotation submission BDD scenarios.

use super::world::{AnnotationWorld, run_async};
use eyre::WrapErr;
use labelforge::annotation::domain::AnnotationDomainError;
use labelforge::annotation::services::AnnotationWorkbenchError;
use labelforge::task::domain::TaskStatus;
use rstest_bdd_macros::then;

#[then("the latest revision carries version {version:u32}")]
fn latest_revision_version(world: &AnnotationWorld, version: u32) -> Result<(), eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    let latest = run_async(world.workbench.latest(task_id, None))
        .wrap_err("read the latest revision")?
        .ok_or_else(|| eyre::eyre!("no revision recorded for the scenario task"))?;

    if latest.version().value() != version {
        return Err(eyre::eyre!(
            "expected version {version}, found {}",
            latest.version()
        ));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &AnnotationWorld, status: String) -> Result<(), eyre::Report> {
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

#[then("the save is rejected for a blank kind")]
fn save_rejected_for_blank_kind(world: &AnnotationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_save
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing save result"))?;

    if !matches!(
        result,
        Err(AnnotationWorkbenchError::Domain(
            AnnotationDomainError::EmptyKind
        ))
    ) {
        return Err(eyre::eyre!("expected EmptyKind error, got {result:?}"));
    }
    Ok(())
}
