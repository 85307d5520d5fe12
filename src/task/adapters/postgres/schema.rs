//! Diesel schema for task persistence.

diesel::table! {
    /// Task records forming a tree through a self-referencing parent key.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Parent task identifier; `NULL` for root tasks.
        parent_id -> Nullable<Uuid>,
        /// Task title.
        title -> Text,
        /// Optional description.
        description -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Priority classification.
        #[max_length = 32]
        priority -> Varchar,
        /// Work classification.
        #[max_length = 32]
        task_type -> Varchar,
        /// Assigned user, if any.
        assigned_to -> Nullable<Int8>,
        /// Creating user.
        created_by -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Optimistic-concurrency version.
        version -> Int8,
    }
}
