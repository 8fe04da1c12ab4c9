//! Diesel schema for annotation tables.

diesel::table! {
    /// Append-only annotation revisions keyed by `(task, user, version)`.
    annotations (id) {
        /// Annotation identifier.
        id -> Uuid,
        /// Task the revision annotates.
        task_id -> Uuid,
        /// Annotator who produced the revision.
        user_id -> Uuid,
        /// Kind label naming the annotation tool.
        #[max_length = 100]
        kind -> Varchar,
        /// Tool-specific payload.
        payload -> Jsonb,
        /// Revision number within the `(task, user)` series.
        version -> Int4,
        /// Lifecycle state of the revision.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Update timestamp.
        updated_at -> Timestamptz,
    }
}
