//! Diesel schema for the shared issue store.
//!
//! The table layout is a fixed contract owned by the store's migrations;
//! this declaration must match it exactly.

diesel::table! {
    /// Issue records shared between producers, workers, and the TUI.
    cape_issues (id) {
        /// Store-assigned issue identifier.
        id -> Int8,
        /// Work description passed to the workflow executable.
        description -> Text,
        /// Optional human-readable title.
        title -> Nullable<Text>,
        /// Lifecycle status, constrained to pending/started/completed.
        status -> Text,
        /// Worker identity the issue is assigned to, if any.
        assigned_to -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last status/assignment change timestamp.
        updated_at -> Timestamptz,
    }
}
