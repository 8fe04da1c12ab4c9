//! When steps for task distribution BDD scenarios.

use super::world::{DistributionWorld, run_async};
use eyre::WrapErr;
use labelforge::task::services::{AssignTasksRequest, UnassignTasksRequest};
use rstest_bdd_macros::when;

#[when("the batch is assigned in rotation")]
fn assign_in_rotation(world: &mut DistributionWorld) -> Result<(), eyre::Report> {
    let count = run_async(world.assignment.assign_round_robin(AssignTasksRequest::new(
        world.batch.iter().copied(),
        world.pool.iter().copied(),
    )))
    .wrap_err("assign the batch in rotation")?;
    world.last_count = Some(count);
    Ok(())
}

#[when("the batch is assigned by workload")]
fn assign_by_workload(world: &mut DistributionWorld) -> Result<(), eyre::Report> {
    let count = run_async(world.assignment.assign_least_load(AssignTasksRequest::new(
        world.batch.iter().copied(),
        world.pool.iter().copied(),
    )))
    .wrap_err("assign the batch by workload")?;
    world.last_count = Some(count);
    Ok(())
}

#[when("the batch is unassigned")]
fn unassign_batch(world: &mut DistributionWorld) -> Result<(), eyre::Report> {
    let count = run_async(
        world
            .assignment
            .unassign(UnassignTasksRequest::new(world.batch.iter().copied())),
    )
    .wrap_err("unassign the batch")?;
    world.last_count = Some(count);
    Ok(())
}
