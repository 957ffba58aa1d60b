//! Error types for issue domain validation and parsing.

use super::{IssueId, IssueStatus};
use thiserror::Error;

/// Errors returned while mutating domain issue values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueDomainError {
    /// The requested status transition is not permitted by the state machine.
    #[error("invalid status transition for issue {issue_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Issue whose transition was rejected.
        issue_id: IssueId,
        /// Status the issue currently holds.
        from: IssueStatus,
        /// Status that was requested.
        to: IssueStatus,
    },
}

/// Error returned while parsing issue statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown issue status: {0}")]
pub struct ParseIssueStatusError(pub String);

/// Error returned while parsing worker identities from configuration or
/// persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown worker identity: {0}")]
pub struct ParseWorkerIdError(pub String);
