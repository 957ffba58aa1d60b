//! Issue aggregate root.

use super::{IssueDomainError, IssueId, IssueStatus, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Issue aggregate root: one unit of work tracked in the shared store.
///
/// Description content is validated by the producers that create issues
/// (CLI scripts and the TUI); the worker treats it as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: IssueId,
    description: String,
    title: Option<String>,
    status: IssueStatus,
    assigned_to: Option<WorkerId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIssueData {
    /// Persisted issue identifier.
    pub id: IssueId,
    /// Persisted work description.
    pub description: String,
    /// Persisted optional title.
    pub title: Option<String>,
    /// Persisted lifecycle status.
    pub status: IssueStatus,
    /// Persisted worker assignment, if any.
    pub assigned_to: Option<WorkerId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Creates a new pending issue, optionally pre-assigned to a worker.
    #[must_use]
    pub fn pending(
        id: IssueId,
        description: impl Into<String>,
        assigned_to: Option<WorkerId>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id,
            description: description.into(),
            title: None,
            status: IssueStatus::Pending,
            assigned_to,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an issue from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIssueData) -> Self {
        let PersistedIssueData {
            id,
            description,
            title,
            status,
            assigned_to,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            description,
            title,
            status,
            assigned_to,
            created_at,
            updated_at,
        }
    }

    /// Returns the issue identifier.
    #[must_use]
    pub const fn id(&self) -> IssueId {
        self.id
    }

    /// Returns the work description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the optional title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns the assigned worker, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<WorkerId> {
        self.assigned_to
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Claims the issue for `worker`, moving it to [`IssueStatus::Started`].
    ///
    /// The assignment is written even when the issue was already assigned to
    /// `worker` (redundant but explicit), keeping the started-implies-assigned
    /// invariant local to this method.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidStatusTransition`] when the issue
    /// is not pending.
    pub fn start(&mut self, worker: WorkerId, clock: &impl Clock) -> Result<(), IssueDomainError> {
        self.transition_to(IssueStatus::Started, clock)?;
        self.assigned_to = Some(worker);
        Ok(())
    }

    /// Marks a started issue as successfully completed.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidStatusTransition`] when the issue
    /// is not started.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), IssueDomainError> {
        self.transition_to(IssueStatus::Completed, clock)
    }

    /// Releases a started issue back to pending after a workflow failure.
    ///
    /// The worker assignment is retained so the owning worker retries the
    /// issue on a later poll.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDomainError::InvalidStatusTransition`] when the issue
    /// is not started.
    pub fn release(&mut self, clock: &impl Clock) -> Result<(), IssueDomainError> {
        self.transition_to(IssueStatus::Pending, clock)
    }

    fn transition_to(
        &mut self,
        next: IssueStatus,
        clock: &impl Clock,
    ) -> Result<(), IssueDomainError> {
        if !self.status.can_transition_to(next) {
            return Err(IssueDomainError::InvalidStatusTransition {
                issue_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
