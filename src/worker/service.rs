//! The worker poll loop: claim, execute, finalize, sleep.

use crate::issue::domain::IssueId;
use crate::issue::ports::{ClaimedIssue, IssueRepository};
use crate::worker::config::WorkerConfig;
use crate::worker::executor::{WorkflowExecutor, WorkflowOutcome};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Result of driving one claim/execute/finalize cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No assigned pending issue was available.
    NoWork,
    /// The issue was processed and recorded as completed.
    Completed(IssueId),
    /// The workflow failed; the issue was released for retry.
    Failed(IssueId),
    /// The workflow exceeded the timeout; the issue was released for retry.
    TimedOut(IssueId),
    /// The store could not be reached while claiming.
    StoreUnavailable,
    /// The workflow finished but the status write-back failed; the issue
    /// remains `started` in the store.
    FinalizeFailed(IssueId),
}

/// Long-running worker loop bound to one worker identity.
///
/// The loop is single-threaded with respect to issue execution: exactly one
/// issue is in flight at a time, and horizontal concurrency comes from
/// running further worker processes under different identities. Mutual
/// exclusion between those processes is delegated entirely to the
/// repository's claim primitive.
pub struct WorkerLoop<R, E>
where
    R: IssueRepository,
    E: WorkflowExecutor,
{
    repository: Arc<R>,
    executor: Arc<E>,
    config: WorkerConfig,
    shutdown: watch::Receiver<bool>,
}

impl<R, E> WorkerLoop<R, E>
where
    R: IssueRepository,
    E: WorkflowExecutor,
{
    /// Creates a worker loop from its collaborators and configuration.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        executor: Arc<E>,
        config: WorkerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            repository,
            executor,
            config,
            shutdown,
        }
    }

    /// Runs claim/execute/finalize cycles until the shutdown flag is set.
    ///
    /// No new issue is claimed once shutdown has been observed. An
    /// in-flight cycle is given the configured grace period to finish;
    /// when it elapses, the cycle is abandoned and the workflow subprocess
    /// is terminated through its kill-on-drop guard.
    pub async fn run(&mut self) {
        info!(worker_id = %self.config.worker_id(), "worker loop started");
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            if self.next_cycle().await {
                break;
            }
            if self.wait_for_next_poll().await {
                break;
            }
        }
        info!(worker_id = %self.config.worker_id(), "worker loop stopped");
    }

    /// Drives one cycle, bounding it by the grace period once shutdown has
    /// been requested.
    ///
    /// Returns `true` when the cycle was abandoned because the grace
    /// period elapsed.
    async fn next_cycle(&self) -> bool {
        let mut shutdown = self.shutdown.clone();
        let cycle = self.run_once();
        tokio::pin!(cycle);
        tokio::select! {
            _outcome = &mut cycle => false,
            // A closed channel means the shutdown sender is gone; treat it
            // like a shutdown request. The guard returned by `wait_for` is
            // dropped inside the block so the future stays `Send`.
            () = async { drop(shutdown.wait_for(|stop| *stop).await) } => {
                match tokio::time::timeout(self.config.shutdown_grace(), &mut cycle).await {
                    Ok(_outcome) => false,
                    Err(_elapsed) => {
                        error!(
                            worker_id = %self.config.worker_id(),
                            "shutdown grace period elapsed; abandoning in-flight workflow",
                        );
                        true
                    }
                }
            }
        }
    }

    /// Drives one full cycle: claim, execute, finalize.
    ///
    /// Every error below startup level is isolated to this cycle; the
    /// caller always gets an outcome, never a propagated failure.
    pub async fn run_once(&self) -> CycleOutcome {
        let worker_id = self.config.worker_id();
        match self.repository.claim_next(worker_id).await {
            Ok(None) => {
                debug!(worker_id = %worker_id, "no pending issues assigned");
                CycleOutcome::NoWork
            }
            Ok(Some(claimed)) => {
                info!(worker_id = %worker_id, issue_id = %claimed.id, "claimed issue for processing");
                self.process(claimed).await
            }
            Err(err) if err.is_connection() => {
                warn!(worker_id = %worker_id, error = %err, "issue store unreachable; backing off");
                CycleOutcome::StoreUnavailable
            }
            Err(err) => {
                error!(worker_id = %worker_id, error = %err, "failed to claim next issue");
                CycleOutcome::StoreUnavailable
            }
        }
    }

    async fn process(&self, claimed: ClaimedIssue) -> CycleOutcome {
        let worker_id = self.config.worker_id();
        let issue_id = claimed.id;

        match self.executor.run(issue_id, &claimed.description).await {
            Ok(outcome) if outcome.is_success() => {
                info!(worker_id = %worker_id, issue_id = %issue_id, "workflow completed");
                match self.repository.mark_completed(issue_id).await {
                    Ok(()) => CycleOutcome::Completed(issue_id),
                    Err(err) => {
                        error!(
                            worker_id = %worker_id,
                            issue_id = %issue_id,
                            error = %err,
                            "failed to record completion; issue remains started",
                        );
                        CycleOutcome::FinalizeFailed(issue_id)
                    }
                }
            }
            Ok(WorkflowOutcome::Exited {
                exit_code,
                stdout,
                stderr,
            }) => {
                error!(
                    worker_id = %worker_id,
                    issue_id = %issue_id,
                    exit_code = ?exit_code,
                    stdout = %stdout,
                    stderr = %stderr,
                    "workflow failed",
                );
                self.release_for_retry(issue_id, CycleOutcome::Failed(issue_id))
                    .await
            }
            Ok(WorkflowOutcome::TimedOut { stdout, stderr }) => {
                error!(
                    worker_id = %worker_id,
                    issue_id = %issue_id,
                    stdout = %stdout,
                    stderr = %stderr,
                    "workflow timed out and was terminated",
                );
                self.release_for_retry(issue_id, CycleOutcome::TimedOut(issue_id))
                    .await
            }
            Err(err) => {
                error!(
                    worker_id = %worker_id,
                    issue_id = %issue_id,
                    error = %err,
                    "workflow executor error",
                );
                self.release_for_retry(issue_id, CycleOutcome::Failed(issue_id))
                    .await
            }
        }
    }

    /// Releases a failed issue back to pending, reporting `on_released` when
    /// the write succeeds.
    async fn release_for_retry(&self, issue_id: IssueId, on_released: CycleOutcome) -> CycleOutcome {
        match self.repository.release(issue_id).await {
            Ok(()) => on_released,
            Err(err) => {
                error!(
                    worker_id = %self.config.worker_id(),
                    issue_id = %issue_id,
                    error = %err,
                    "failed to release issue for retry; issue remains started",
                );
                CycleOutcome::FinalizeFailed(issue_id)
            }
        }
    }

    /// Sleeps one poll interval, waking early on shutdown.
    ///
    /// Returns `true` when shutdown was observed.
    async fn wait_for_next_poll(&mut self) -> bool {
        if *self.shutdown.borrow() {
            return true;
        }
        let sleep = tokio::time::sleep(self.config.poll_interval());
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return *self.shutdown.borrow(),
                changed = self.shutdown.changed() => {
                    // A closed channel means the shutdown sender is gone;
                    // treat it as a request to stop.
                    if changed.is_err() || *self.shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }
}
