//! Assignment flow tests over the in-memory adapters.

use std::io;

use labelforge::task::domain::{ProjectId, Task, TaskEventKind, TaskId, UserId};
use labelforge::task::services::{AssignTasksRequest, ListTasksRequest, UnassignTasksRequest};
use rstest::rstest;
use tokio::runtime::Runtime;

use super::helpers::{Platform, TestWorkflow, annotator_pool, platform, runtime, seed_project_tasks};

/// Reloads every task of a project in one page.
async fn project_tasks(workflow: &TestWorkflow, project_id: ProjectId) -> Vec<Task> {
    workflow
        .list(ListTasksRequest::new(project_id).with_page_size(50))
        .await
        .expect("list tasks")
        .tasks
}

fn held_by(tasks: &[Task], annotator: UserId) -> usize {
    tasks
        .iter()
        .filter(|task| task.assignee() == Some(annotator))
        .count()
}

#[rstest]
fn rotation_spreads_a_seeded_batch(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 4).await;
        let ids: Vec<TaskId> = seeded.iter().map(Task::id).collect();
        let pool = annotator_pool(2);

        let assigned = platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new(ids, pool.clone()))
            .await
            .expect("round robin assignment");
        assert_eq!(assigned, 4);

        let tasks = project_tasks(&platform.workflow, project_id).await;
        assert!(tasks.iter().all(|task| task.assignee().is_some()));
        assert_eq!(held_by(&tasks, pool[0]), 2);
        assert_eq!(held_by(&tasks, pool[1]), 2);
    });
}

#[rstest]
fn load_balancing_tops_up_the_idle_annotator(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let busy = UserId::new();
        let idle = UserId::new();

        let first_batch = seed_project_tasks(&platform, project_id, 2).await;
        platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new(
                first_batch.iter().map(Task::id),
                [busy],
            ))
            .await
            .expect("first assignment");

        let second_batch = seed_project_tasks(&platform, project_id, 2).await;
        let assigned = platform
            .assignment
            .assign_least_load(AssignTasksRequest::new(
                second_batch.iter().map(Task::id),
                [busy, idle],
            ))
            .await
            .expect("load-based assignment");
        assert_eq!(assigned, 2);

        let tasks = project_tasks(&platform.workflow, project_id).await;
        assert_eq!(held_by(&tasks, busy), 2, "the busy annotator gains nothing");
        assert_eq!(held_by(&tasks, idle), 2, "the idle annotator absorbs the batch");
    });
}

#[rstest]
fn reassignment_replaces_the_holder(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 1).await;
        let task_id = seeded[0].id();
        let original = UserId::new();
        let replacement = UserId::new();

        platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new([task_id], [original]))
            .await
            .expect("first assignment");
        platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new([task_id], [replacement]))
            .await
            .expect("second assignment");

        let task = platform
            .workflow
            .get_task(task_id)
            .await
            .expect("task lookup")
            .expect("task present");
        assert_eq!(task.assignee(), Some(replacement));

        let history = platform
            .workflow
            .task_history(task_id)
            .await
            .expect("task history");
        let assignees: Vec<Option<UserId>> = history.iter().map(|event| event.assignee()).collect();
        assert_eq!(assignees, vec![Some(original), Some(replacement)]);
        assert!(
            history
                .iter()
                .all(|event| event.kind() == TaskEventKind::Assigned)
        );
    });
}

#[rstest]
fn unassignment_returns_tasks_to_the_pool(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 2).await;
        let ids: Vec<TaskId> = seeded.iter().map(Task::id).collect();
        let pool = annotator_pool(2);

        platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new(ids.iter().copied(), pool))
            .await
            .expect("assignment");
        let cleared = platform
            .assignment
            .unassign(UnassignTasksRequest::new(ids.iter().copied()))
            .await
            .expect("unassignment");
        assert_eq!(cleared, 2);

        let tasks = project_tasks(&platform.workflow, project_id).await;
        assert!(tasks.iter().all(|task| task.assignee().is_none()));

        for id in &ids {
            let kinds: Vec<TaskEventKind> = platform
                .workflow
                .task_history(*id)
                .await
                .expect("task history")
                .iter()
                .map(|event| event.kind())
                .collect();
            assert_eq!(kinds, vec![TaskEventKind::Assigned, TaskEventKind::Unassigned]);
        }
    });
}
