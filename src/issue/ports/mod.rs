//! Port contracts for the issue domain.

mod repository;

pub use repository::{ClaimedIssue, IssueRepository, IssueRepositoryError, IssueRepositoryResult};
