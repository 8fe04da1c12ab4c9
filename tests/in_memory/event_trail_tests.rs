//! Audit trail tests over the in-memory adapters.

use std::io;

use labelforge::task::domain::{ProjectId, Task, TaskEventKind, TaskId, UserId};
use labelforge::task::services::{
    AssignTasksRequest, BulkChangeStatusRequest, ChangeTaskStatusRequest, DeleteTasksRequest,
    UnassignTasksRequest,
};
use rstest::rstest;
use tokio::runtime::Runtime;

use super::helpers::{Platform, platform, runtime, seed_project_tasks};

#[rstest]
fn the_trail_outlives_its_task(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 1).await;
        let task_id = seeded[0].id();
        let annotator = UserId::new();
        let admin = UserId::new();

        platform
            .workflow
            .change_status(ChangeTaskStatusRequest::new(task_id, "IN_PROGRESS"))
            .await
            .expect("status change");
        platform
            .assignment
            .assign_round_robin(AssignTasksRequest::new([task_id], [annotator]))
            .await
            .expect("assignment");
        platform
            .assignment
            .unassign(UnassignTasksRequest::new([task_id]))
            .await
            .expect("unassignment");
        let deleted = platform
            .workflow
            .delete(DeleteTasksRequest::new([task_id]).with_actor(admin))
            .await
            .expect("deletion");
        assert_eq!(deleted, 1);

        let lookup = platform
            .workflow
            .get_task(task_id)
            .await
            .expect("task lookup");
        assert!(lookup.is_none(), "the task row is gone");

        let history = platform
            .workflow
            .task_history(task_id)
            .await
            .expect("task history");
        let kinds: Vec<TaskEventKind> = history.iter().map(|event| event.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                TaskEventKind::StatusChanged,
                TaskEventKind::Assigned,
                TaskEventKind::Unassigned,
                TaskEventKind::Deleted,
            ]
        );
        assert!(
            history
                .windows(2)
                .all(|pair| pair[0].occurred_at() <= pair[1].occurred_at()),
            "events arrive oldest first"
        );
        assert_eq!(history[3].actor(), Some(admin));
    });
}

#[rstest]
fn batch_operations_stamp_one_event_per_task(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 3).await;
        let ids: Vec<TaskId> = seeded.iter().map(Task::id).collect();

        platform
            .workflow
            .bulk_change_status(BulkChangeStatusRequest::new(ids.iter().copied(), "IN_PROGRESS"))
            .await
            .expect("bulk status change");

        for id in &ids {
            let history = platform
                .workflow
                .task_history(*id)
                .await
                .expect("task history");
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].kind(), TaskEventKind::StatusChanged);
            assert_eq!(history[0].task_id(), *id);
        }
    });
}

#[rstest]
fn batch_deletion_leaves_a_tombstone_per_task(runtime: io::Result<Runtime>, platform: Platform) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(async {
        let project_id = ProjectId::new();
        let seeded = seed_project_tasks(&platform, project_id, 2).await;
        let ids: Vec<TaskId> = seeded.iter().map(Task::id).collect();

        let deleted = platform
            .workflow
            .delete(DeleteTasksRequest::new(ids.iter().copied()))
            .await
            .expect("deletion");
        assert_eq!(deleted, 2);

        for id in &ids {
            let history = platform
                .workflow
                .task_history(*id)
                .await
                .expect("task history");
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].kind(), TaskEventKind::Deleted);
            assert!(history[0].actor().is_none());
        }
    });
}
