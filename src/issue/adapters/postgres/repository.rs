//! `PostgreSQL` repository implementation over the shared issue store.

use super::{
    models::{ClaimedIssueRow, IssueRow},
    schema::cape_issues,
};
use crate::issue::{
    domain::{Issue, IssueId, IssueStatus, PersistedIssueData, WorkerId},
    ports::{ClaimedIssue, IssueRepository, IssueRepositoryError, IssueRepositoryResult},
};
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by issue adapters.
pub type IssuePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed issue repository.
///
/// Claiming delegates to the server-side `get_and_lock_next_issue` function,
/// whose lock-and-skip selection makes concurrent claims against the same
/// candidate set mutually exclusive without any coordination in this process.
#[derive(Debug, Clone)]
pub struct PostgresIssueRepository {
    pool: IssuePgPool,
}

impl PostgresIssueRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IssuePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> IssueRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> IssueRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            // A pool checkout failure means no connection could be
            // established, which the loop treats as transient.
            let mut connection = pool.get().map_err(IssueRepositoryError::connection)?;
            f(&mut connection)
        })
        .await
        .map_err(IssueRepositoryError::persistence)?
    }
}

#[async_trait]
impl IssueRepository for PostgresIssueRepository {
    async fn claim_next(&self, worker_id: WorkerId) -> IssueRepositoryResult<Option<ClaimedIssue>> {
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(
                "SELECT issue_id, issue_description FROM get_and_lock_next_issue($1)",
            )
            .bind::<diesel::sql_types::Text, _>(worker_id.as_str())
            .load::<ClaimedIssueRow>(connection)
            .map_err(map_diesel_error)?;

            Ok(rows.into_iter().next().map(|row| ClaimedIssue {
                id: IssueId::new(row.issue_id),
                description: row.issue_description,
            }))
        })
        .await
    }

    async fn mark_completed(&self, id: IssueId) -> IssueRepositoryResult<()> {
        self.write_status(id, IssueStatus::Completed).await
    }

    async fn release(&self, id: IssueId) -> IssueRepositoryResult<()> {
        self.write_status(id, IssueStatus::Pending).await
    }

    async fn find_by_id(&self, id: IssueId) -> IssueRepositoryResult<Option<Issue>> {
        self.run_blocking(move |connection| {
            let row = load_issue_row(connection, id)?;
            row.map(row_to_issue).transpose()
        })
        .await
    }
}

impl PostgresIssueRepository {
    /// Finalize write shared by completion and release.
    ///
    /// The update is guarded on `status = 'started'` so a concurrent state
    /// change is reported instead of silently overwritten; `assigned_to` is
    /// left untouched, preserving the assignment for retries.
    async fn write_status(&self, id: IssueId, next: IssueStatus) -> IssueRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                cape_issues::table.filter(
                    cape_issues::id
                        .eq(id.value())
                        .and(cape_issues::status.eq(IssueStatus::Started.as_str())),
                ),
            )
            .set((
                cape_issues::status.eq(next.as_str()),
                cape_issues::updated_at.eq(Utc::now()),
            ))
            .execute(connection)
            .map_err(map_diesel_error)?;

            if updated == 0 {
                let existing =
                    load_issue_row(connection, id)?.ok_or(IssueRepositoryError::NotFound(id))?;
                let status = IssueStatus::try_from(existing.status.as_str())
                    .map_err(IssueRepositoryError::persistence)?;
                return Err(IssueRepositoryError::UnexpectedStatus { id, status });
            }

            Ok(())
        })
        .await
    }
}

fn load_issue_row(
    connection: &mut PgConnection,
    id: IssueId,
) -> IssueRepositoryResult<Option<IssueRow>> {
    cape_issues::table
        .filter(cape_issues::id.eq(id.value()))
        .select(IssueRow::as_select())
        .first::<IssueRow>(connection)
        .optional()
        .map_err(map_diesel_error)
}

fn row_to_issue(row: IssueRow) -> IssueRepositoryResult<Issue> {
    let IssueRow {
        id,
        description,
        title,
        status: persisted_status,
        assigned_to: persisted_assignment,
        created_at,
        updated_at,
    } = row;

    let status = IssueStatus::try_from(persisted_status.as_str())
        .map_err(IssueRepositoryError::persistence)?;
    let assigned_to = persisted_assignment
        .as_deref()
        .map(WorkerId::try_from)
        .transpose()
        .map_err(IssueRepositoryError::persistence)?;

    Ok(Issue::from_persisted(PersistedIssueData {
        id: IssueId::new(id),
        description,
        title,
        status,
        assigned_to,
        created_at,
        updated_at,
    }))
}

fn map_diesel_error(err: DieselError) -> IssueRepositoryError {
    let is_connection = matches!(
        &err,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    );
    if is_connection {
        IssueRepositoryError::connection(err)
    } else {
        IssueRepositoryError::persistence(err)
    }
}
