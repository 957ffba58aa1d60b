//! Domain model for issue lifecycle management.
//!
//! The issue domain models the status state machine, worker assignment, and
//! claim semantics while keeping all infrastructure concerns outside of the
//! domain boundary.

mod error;
mod ids;
mod issue;
mod status;

pub use error::{IssueDomainError, ParseIssueStatusError, ParseWorkerIdError};
pub use ids::{IssueId, WorkerId};
pub use issue::{Issue, PersistedIssueData};
pub use status::IssueStatus;
