//! When steps for annotation submission BDD scenarios.

use super::world::{AnnotationWorld, run_async};
use labelforge::annotation::services::SaveAnnotationRequest;
use rstest_bdd_macros::when;
use serde_json::json;

fn save_request(world: &AnnotationWorld, kind: &str) -> Result<SaveAnnotationRequest, eyre::Report> {
    let task_id = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?
        .id();
    Ok(SaveAnnotationRequest::new(
        task_id,
        world.annotator,
        kind,
        json!({ "x": 3, "y": 7 }),
    ))
}

#[when(r#"the annotator saves a "{kind}" draft"#)]
fn save_draft(world: &mut AnnotationWorld, kind: String) -> Result<(), eyre::Report> {
    let request = save_request(world, &kind)?;
    let result = run_async(world.workbench.save_draft(request));
    world.last_save = Some(result);
    Ok(())
}

#[when(r#"the annotator submits a "{kind}" revision"#)]
fn submit_revision(world: &mut AnnotationWorld, kind: String) -> Result<(), eyre::Report> {
    let request = save_request(world, &kind)?;
    let result = run_async(world.workbench.submit(request));
    world.last_save = Some(result);
    Ok(())
}
