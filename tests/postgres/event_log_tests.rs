//! Event log tests against a real `PostgreSQL` database.

use chrono::Duration;
use labelforge::task::domain::{
    PersistedTaskEventData, TaskEvent, TaskEventId, TaskEventKind, TaskId, TaskStatus, UserId,
};
use labelforge::task::ports::TaskEventLog;
use rstest::rstest;

use crate::postgres::helpers::{PgContext, anchor, pg_context, status_event_row};

#[rstest]
fn the_trail_comes_back_oldest_first(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();

    let early = status_event_row(task_id, TaskStatus::Pending, TaskStatus::InProgress, anchor());
    let mid = status_event_row(
        task_id,
        TaskStatus::InProgress,
        TaskStatus::Done,
        anchor() + Duration::seconds(1),
    );
    let late = status_event_row(
        task_id,
        TaskStatus::Done,
        TaskStatus::ToReview,
        anchor() + Duration::seconds(2),
    );

    // Appended out of order; the read side sorts by occurrence.
    context
        .rt
        .block_on(context.events.append(&[late, early]))
        .expect("first append");
    context
        .rt
        .block_on(context.events.append(&[mid]))
        .expect("second append");

    let trail = context
        .rt
        .block_on(context.events.for_task(task_id))
        .expect("trail read");
    let ids: Vec<TaskEventId> = trail.iter().map(TaskEvent::id).collect();
    assert_eq!(ids, vec![early.id(), mid.id(), late.id()]);

    context.cleanup();
}

#[rstest]
fn every_event_kind_round_trips(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let annotator = UserId::new();
    let admin = UserId::new();

    let events = [
        TaskEvent::from_persisted(PersistedTaskEventData {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::StatusChanged,
            from_status: Some(TaskStatus::Pending),
            to_status: Some(TaskStatus::InProgress),
            assignee: None,
            actor: Some(admin),
            occurred_at: anchor(),
        }),
        TaskEvent::from_persisted(PersistedTaskEventData {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Assigned,
            from_status: None,
            to_status: None,
            assignee: Some(annotator),
            actor: Some(admin),
            occurred_at: anchor() + Duration::seconds(1),
        }),
        TaskEvent::from_persisted(PersistedTaskEventData {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Unassigned,
            from_status: None,
            to_status: None,
            assignee: Some(annotator),
            actor: None,
            occurred_at: anchor() + Duration::seconds(2),
        }),
        TaskEvent::from_persisted(PersistedTaskEventData {
            id: TaskEventId::new(),
            task_id,
            kind: TaskEventKind::Deleted,
            from_status: None,
            to_status: None,
            assignee: None,
            actor: Some(admin),
            occurred_at: anchor() + Duration::seconds(3),
        }),
    ];

    context
        .rt
        .block_on(context.events.append(&events))
        .expect("append");
    let trail = context
        .rt
        .block_on(context.events.for_task(task_id))
        .expect("trail read");

    assert_eq!(trail, events);

    context.cleanup();
}

#[rstest]
fn the_trail_covers_one_task_only(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let watched = TaskId::new();
    let other = TaskId::new();

    let ours = status_event_row(watched, TaskStatus::Pending, TaskStatus::InProgress, anchor());
    let theirs = status_event_row(other, TaskStatus::Pending, TaskStatus::InProgress, anchor());
    context
        .rt
        .block_on(context.events.append(&[ours, theirs]))
        .expect("append");

    let trail = context
        .rt
        .block_on(context.events.for_task(watched))
        .expect("trail read");
    assert_eq!(trail, vec![ours]);

    context.cleanup();
}

#[rstest]
fn an_empty_append_is_a_noop(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };

    context
        .rt
        .block_on(context.events.append(&[]))
        .expect("empty append");
    let trail = context
        .rt
        .block_on(context.events.for_task(TaskId::new()))
        .expect("trail read");
    assert!(trail.is_empty());

    context.cleanup();
}
