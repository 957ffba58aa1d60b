//! Repository port for issue claiming and status write-back.

use crate::issue::domain::{Issue, IssueId, IssueStatus, WorkerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue repository operations.
pub type IssueRepositoryResult<T> = Result<T, IssueRepositoryError>;

/// Projection of a claimed issue, as returned by the store's claim primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedIssue {
    /// Identifier of the claimed issue.
    pub id: IssueId,
    /// Work description passed to the workflow executable.
    pub description: String,
}

/// Issue persistence contract.
///
/// Mutual exclusion between concurrently polling workers is owed entirely to
/// the implementation of [`IssueRepository::claim_next`]; callers add no
/// locking of their own.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Atomically claims the oldest pending issue assigned to `worker_id`.
    ///
    /// The claimed issue transitions to `started` with `assigned_to` set as
    /// part of the same atomic operation. Returns `Ok(None)` when no
    /// assigned pending issue exists; an empty queue is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::Connection`] when the store is
    /// unreachable, which callers must not conflate with an empty queue.
    async fn claim_next(&self, worker_id: WorkerId) -> IssueRepositoryResult<Option<ClaimedIssue>>;

    /// Records successful workflow completion, moving `started → completed`.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::NotFound`] when the issue does not
    /// exist and [`IssueRepositoryError::UnexpectedStatus`] when it is no
    /// longer started.
    async fn mark_completed(&self, id: IssueId) -> IssueRepositoryResult<()>;

    /// Releases a started issue back to `pending` after a workflow failure,
    /// retaining its worker assignment for retry.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::NotFound`] when the issue does not
    /// exist and [`IssueRepositoryError::UnexpectedStatus`] when it is no
    /// longer started.
    async fn release(&self, id: IssueId) -> IssueRepositoryResult<()>;

    /// Finds an issue by identifier.
    ///
    /// Returns `None` when the issue does not exist.
    async fn find_by_id(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>>;
}

/// Errors returned by issue repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IssueRepositoryError {
    /// The issue was not found.
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// The issue holds a status the requested write does not apply to.
    #[error("issue {id} has unexpected status {status}")]
    UnexpectedStatus {
        /// Issue whose write was rejected.
        id: IssueId,
        /// Status the store currently holds for the issue.
        status: IssueStatus,
    },

    /// The store could not be reached. Distinct from an empty queue.
    #[error("issue store unreachable: {0}")]
    Connection(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure other than connectivity.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueRepositoryError {
    /// Wraps a transport/connectivity error.
    #[must_use]
    pub fn connection(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection(Arc::new(err))
    }

    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether the error reports store connectivity loss.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
