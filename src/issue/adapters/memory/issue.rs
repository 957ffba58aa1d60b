//! In-memory repository for issue lifecycle tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::issue::{
    domain::{Issue, IssueDomainError, IssueId, IssueStatus, WorkerId},
    ports::{ClaimedIssue, IssueRepository, IssueRepositoryError, IssueRepositoryResult},
};

/// Thread-safe in-memory issue repository.
///
/// Claim semantics mirror the store's locking primitive: candidate selection
/// and the `pending → started` transition happen under one write lock, so
/// concurrent claims against the same candidate set never both succeed.
/// [`InMemoryIssueRepository::set_offline`] simulates store connectivity
/// loss for error-path tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueRepository {
    state: Arc<RwLock<InMemoryIssueState>>,
    offline: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct InMemoryIssueState {
    issues: BTreeMap<IssueId, Issue>,
}

impl InMemoryIssueRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with an issue, replacing any previous record
    /// with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::Persistence`] when the state lock is
    /// poisoned.
    pub fn insert(&self, issue: Issue) -> IssueRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.issues.insert(issue.id(), issue);
        Ok(())
    }

    /// Toggles simulated store connectivity loss: while offline, every
    /// operation fails with [`IssueRepositoryError::Connection`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> IssueRepositoryResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(IssueRepositoryError::connection(std::io::Error::other(
                "simulated store outage",
            )));
        }
        Ok(())
    }

    fn write_state(
        &self,
    ) -> IssueRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryIssueState>> {
        self.state.write().map_err(|err| {
            IssueRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn read_state(
        &self,
    ) -> IssueRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryIssueState>> {
        self.state.read().map_err(|err| {
            IssueRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl IssueRepository for InMemoryIssueRepository {
    async fn claim_next(&self, worker_id: WorkerId) -> IssueRepositoryResult<Option<ClaimedIssue>> {
        self.ensure_online()?;
        let mut state = self.write_state()?;

        let candidate = state
            .issues
            .values()
            .filter(|issue| {
                issue.status() == IssueStatus::Pending && issue.assigned_to() == Some(worker_id)
            })
            .min_by_key(|issue| (issue.created_at(), issue.id()))
            .map(Issue::id);

        let Some(id) = candidate else {
            return Ok(None);
        };

        let Some(issue) = state.issues.get_mut(&id) else {
            return Ok(None);
        };
        issue
            .start(worker_id, &DefaultClock)
            .map_err(IssueRepositoryError::persistence)?;

        Ok(Some(ClaimedIssue {
            id,
            description: issue.description().to_owned(),
        }))
    }

    async fn mark_completed(&self, id: IssueId) -> IssueRepositoryResult<()> {
        self.write_started(id, |issue, clock| issue.complete(clock))
    }

    async fn release(&self, id: IssueId) -> IssueRepositoryResult<()> {
        self.write_started(id, |issue, clock| issue.release(clock))
    }

    async fn find_by_id(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>> {
        self.ensure_online()?;
        let state = self.read_state()?;
        Ok(state.issues.get(&id).cloned())
    }
}

impl InMemoryIssueRepository {
    /// Finalize write shared by completion and release.
    fn write_started<F>(&self, id: IssueId, apply: F) -> IssueRepositoryResult<()>
    where
        F: FnOnce(&mut Issue, &DefaultClock) -> Result<(), IssueDomainError>,
    {
        self.ensure_online()?;
        let mut state = self.write_state()?;
        let issue = state
            .issues
            .get_mut(&id)
            .ok_or(IssueRepositoryError::NotFound(id))?;
        if issue.status() != IssueStatus::Started {
            return Err(IssueRepositoryError::UnexpectedStatus {
                id,
                status: issue.status(),
            });
        }
        apply(issue, &DefaultClock).map_err(IssueRepositoryError::persistence)
    }
}
