//! Assignment planning strategies for distributing tasks across annotators.
//!
//! Planners are pure functions over identifiers and load snapshots. They
//! decide who gets what; applying the plan and recording events is the
//! service layer's job.

use super::{TaskId, UserId};
use std::collections::HashMap;

/// Planned pairing of one task with one annotator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAssignment {
    /// Task receiving an annotator.
    pub task_id: TaskId,
    /// Annotator receiving the task.
    pub annotator: UserId,
}

/// Open-task tally for one annotator at planning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatorLoad {
    /// Annotator the tally belongs to.
    pub annotator: UserId,
    /// Number of open (pending or in-progress) tasks currently held.
    pub open_tasks: usize,
}

/// Pairs tasks with annotators in rotation.
///
/// Tasks keep their supplied order: the first task goes to the first
/// annotator, the second to the second, wrapping around when the pool is
/// exhausted. An empty pool or an empty task list yields an empty plan.
#[must_use]
pub fn plan_round_robin(task_ids: &[TaskId], annotators: &[UserId]) -> Vec<PlannedAssignment> {
    if annotators.is_empty() {
        return Vec::new();
    }

    task_ids
        .iter()
        .copied()
        .zip(annotators.iter().copied().cycle())
        .map(|(task_id, annotator)| PlannedAssignment { task_id, annotator })
        .collect()
}

/// Pairs each task with whichever annotator currently holds the fewest open
/// tasks.
///
/// `loads` seeds the running tally; annotators absent from it start at
/// zero, and entries for users outside the pool are ignored. Ties go to the
/// annotator listed first in `annotators`. Every planned assignment bumps
/// the winner's tally, so a large batch spreads across the pool instead of
/// landing entirely on the initially least-loaded annotator. An empty pool
/// or an empty task list yields an empty plan.
#[must_use]
pub fn plan_least_load(
    task_ids: &[TaskId],
    annotators: &[UserId],
    loads: &[AnnotatorLoad],
) -> Vec<PlannedAssignment> {
    if annotators.is_empty() {
        return Vec::new();
    }

    let mut tallies: HashMap<UserId, usize> = annotators
        .iter()
        .map(|annotator| (*annotator, 0))
        .collect();
    for load in loads {
        if let Some(tally) = tallies.get_mut(&load.annotator) {
            *tally = load.open_tasks;
        }
    }

    let mut plan = Vec::with_capacity(task_ids.len());
    for task_id in task_ids.iter().copied() {
        let Some(annotator) = least_loaded(annotators, &tallies) else {
            break;
        };
        plan.push(PlannedAssignment { task_id, annotator });
        if let Some(tally) = tallies.get_mut(&annotator) {
            *tally = tally.saturating_add(1);
        }
    }
    plan
}

/// Returns the first annotator holding the strictly smallest tally.
fn least_loaded(annotators: &[UserId], tallies: &HashMap<UserId, usize>) -> Option<UserId> {
    let mut best: Option<(UserId, usize)> = None;
    for annotator in annotators.iter().copied() {
        let load = tallies.get(&annotator).copied().unwrap_or(0);
        let beats_current = best.is_none_or(|(_, best_load)| load < best_load);
        if beats_current {
            best = Some((annotator, load));
        }
    }
    best.map(|(annotator, _)| annotator)
}
