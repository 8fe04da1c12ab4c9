//! Annotation repository tests against a real `PostgreSQL` database.

use chrono::Duration;
use labelforge::annotation::domain::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStatus, AnnotationVersion,
    PersistedAnnotationData,
};
use labelforge::annotation::ports::{AnnotationRepository, AnnotationRepositoryError};
use labelforge::task::domain::{TaskId, UserId};
use rstest::rstest;
use serde_json::json;

use crate::postgres::helpers::{PgContext, anchor, annotation_row, pg_context};

#[rstest]
fn a_series_reads_back_oldest_first(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let annotator = UserId::new();

    let first = annotation_row(task_id, annotator, 1, anchor());
    let second = annotation_row(task_id, annotator, 2, anchor() + Duration::seconds(1));

    context
        .rt
        .block_on(context.annotations.append(&second))
        .expect("append second");
    context
        .rt
        .block_on(context.annotations.append(&first))
        .expect("append first");

    let series = context
        .rt
        .block_on(context.annotations.for_task(task_id))
        .expect("series read");
    let ids: Vec<_> = series.iter().map(Annotation::id).collect();
    assert_eq!(ids, vec![first.id(), second.id()]);

    context.cleanup();
}

#[rstest]
fn the_version_triple_is_unique(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let annotator = UserId::new();
    let other = UserId::new();

    context
        .rt
        .block_on(
            context
                .annotations
                .append(&annotation_row(task_id, annotator, 1, anchor())),
        )
        .expect("first append");

    let rival = annotation_row(task_id, annotator, 1, anchor() + Duration::seconds(1));
    let conflict = context.rt.block_on(context.annotations.append(&rival));
    assert!(matches!(
        conflict,
        Err(AnnotationRepositoryError::VersionConflict {
            task_id: conflict_task,
            user_id: conflict_user,
            version: conflict_version,
        }) if conflict_task == task_id
            && conflict_user == annotator
            && conflict_version.value() == 1
    ));

    // The same version number is free for a different annotator.
    context
        .rt
        .block_on(
            context
                .annotations
                .append(&annotation_row(task_id, other, 1, anchor())),
        )
        .expect("other annotator's append");

    context.cleanup();
}

#[rstest]
fn latest_prefers_the_highest_version(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let annotator = UserId::new();

    // The higher version carries the older update stamp.
    let stale_low = annotation_row(task_id, annotator, 1, anchor() + Duration::seconds(5));
    let head = annotation_row(task_id, annotator, 2, anchor());
    context
        .rt
        .block_on(context.annotations.append(&stale_low))
        .expect("append low version");
    context
        .rt
        .block_on(context.annotations.append(&head))
        .expect("append high version");

    let latest = context
        .rt
        .block_on(context.annotations.latest(task_id, Some(annotator)))
        .expect("latest read")
        .expect("a revision exists");
    assert_eq!(latest.id(), head.id());

    context.cleanup();
}

#[rstest]
fn latest_breaks_version_ties_by_update_time(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let earlier = UserId::new();
    let later = UserId::new();

    let earlier_head = annotation_row(task_id, earlier, 3, anchor());
    let later_head = annotation_row(task_id, later, 3, anchor() + Duration::seconds(1));
    context
        .rt
        .block_on(context.annotations.append(&earlier_head))
        .expect("append earlier head");
    context
        .rt
        .block_on(context.annotations.append(&later_head))
        .expect("append later head");

    let latest = context
        .rt
        .block_on(context.annotations.latest(task_id, None))
        .expect("latest read")
        .expect("a revision exists");
    assert_eq!(latest.id(), later_head.id());

    context.cleanup();
}

#[rstest]
fn jsonb_payloads_round_trip(pg_context: Option<PgContext>) {
    let Some(context) = pg_context else { return };
    let task_id = TaskId::new();
    let annotator = UserId::new();

    let payload = json!({
        "label": "cat",
        "shapes": [
            { "type": "polygon", "points": [[0, 1], [2, 3], [4, 5]] },
            { "type": "bbox", "x": 10, "y": 20, "w": 30, "h": 40 },
        ],
        "confidence": 0.92,
    });
    let revision = Annotation::from_persisted(PersistedAnnotationData {
        id: AnnotationId::new(),
        task_id,
        user_id: annotator,
        kind: AnnotationKind::new("segmentation").expect("valid kind"),
        payload: payload.clone(),
        version: AnnotationVersion::FIRST,
        status: AnnotationStatus::Submitted,
        created_at: anchor(),
        updated_at: anchor(),
    });

    context
        .rt
        .block_on(context.annotations.append(&revision))
        .expect("append");
    let series = context
        .rt
        .block_on(context.annotations.for_task(task_id))
        .expect("series read");

    assert_eq!(series.len(), 1);
    assert_eq!(series[0], revision);
    assert_eq!(*series[0].payload(), payload);

    context.cleanup();
}
