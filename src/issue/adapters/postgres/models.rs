//! Diesel row models for issue persistence.

use super::schema::cape_issues;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for issue records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cape_issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IssueRow {
    /// Store-assigned issue identifier.
    pub id: i64,
    /// Work description.
    pub description: String,
    /// Optional title.
    pub title: Option<String>,
    /// Lifecycle status string.
    pub status: String,
    /// Assigned worker identity string, if any.
    pub assigned_to: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Result row of the `get_and_lock_next_issue` claim function.
#[derive(Debug, Clone, QueryableByName)]
pub struct ClaimedIssueRow {
    /// Identifier of the atomically claimed issue.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub issue_id: i64,
    /// Description of the atomically claimed issue.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub issue_description: String,
}
