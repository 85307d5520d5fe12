//! Diesel schema for task message persistence.

diesel::table! {
    /// Messages attached to tasks.
    task_messages (id) {
        /// Message identifier.
        id -> Uuid,
        /// Insertion sequence; breaks ties between equal timestamps.
        seq -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Message text.
        body -> Text,
        /// Posting user.
        sender_id -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
