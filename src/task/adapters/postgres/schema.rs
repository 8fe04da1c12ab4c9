//! Diesel schema for task and event trail persistence.

diesel::table! {
    /// Task records with workflow status and assignment columns.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Source dataset.
        dataset_id -> Uuid,
        /// Dataset item the task annotates.
        data_item_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Workflow status.
        #[max_length = 50]
        status -> Varchar,
        /// Scheduling priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Assigned annotator, when assigned.
        assigned_to -> Nullable<Uuid>,
        /// Assignment instant, when assigned.
        assigned_at -> Nullable<Timestamptz>,
        /// Creation metadata payload.
        metadata -> Nullable<Jsonb>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only task mutation trail.
    ///
    /// Deliberately unconstrained by a foreign key so entries outlive the
    /// tasks they describe.
    task_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Parent task identifier.
        task_id -> Uuid,
        /// Event kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Status before the change, for status events.
        #[max_length = 50]
        from_status -> Nullable<Varchar>,
        /// Status after the change, for status events.
        #[max_length = 50]
        to_status -> Nullable<Varchar>,
        /// Affected annotator, for assignment events.
        assignee -> Nullable<Uuid>,
        /// User who performed the mutation, when known.
        actor -> Nullable<Uuid>,
        /// Occurrence timestamp.
        occurred_at -> Timestamptz,
    }
}
