//! Workflow executor port and subprocess adapter.
//!
//! The workflow executable is an external collaborator: the worker passes
//! it an issue id and description, bounds it with a hard wall-clock
//! timeout, and interprets only its exit code and captured output.

use crate::issue::domain::IssueId;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::warn;

/// Result of one bounded workflow execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The subprocess exited on its own within the timeout.
    Exited {
        /// Process exit code; `None` when terminated by a signal.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The subprocess exceeded the timeout and was force-terminated.
    TimedOut {
        /// Output captured before the kill.
        stdout: String,
        /// Error output captured before the kill.
        stderr: String,
    },
}

impl WorkflowOutcome {
    /// Returns whether the workflow reported success (exit code zero).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Exited {
                exit_code: Some(0),
                ..
            }
        )
    }
}

/// Errors raised while running the workflow executable itself.
///
/// Executor errors are issue-level failures: the loop releases the claimed
/// issue for retry, exactly as it does for a non-zero exit.
#[derive(Debug, Error)]
pub enum WorkflowExecutorError {
    /// The workflow command could not be spawned.
    #[error("failed to spawn workflow command '{command}': {source}")]
    Spawn {
        /// Command that failed to spawn.
        command: String,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },

    /// Subprocess supervision failed after a successful spawn.
    #[error("workflow subprocess error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for workflow executor operations.
pub type WorkflowExecutorResult<T> = Result<T, WorkflowExecutorError>;

/// Executes the multi-stage workflow for one claimed issue.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync {
    /// Runs the workflow for `issue_id`, bounded by the adapter's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowExecutorError`] when the workflow executable could
    /// not be spawned or supervised. A workflow that runs and fails is not
    /// an error; it is a [`WorkflowOutcome`].
    async fn run(&self, issue_id: IssueId, description: &str)
    -> WorkflowExecutorResult<WorkflowOutcome>;
}

/// Subprocess-backed workflow executor.
///
/// Invokes the configured program with the issue id and description as
/// positional arguments (the `cape-adw <issue_id> <description>` contract),
/// drains stdout and stderr concurrently, and kills the child once the
/// wall-clock timeout expires.
#[derive(Debug, Clone)]
pub struct SubprocessWorkflowExecutor {
    program: PathBuf,
    timeout: Duration,
}

impl SubprocessWorkflowExecutor {
    /// Creates an executor for the given program and execution timeout.
    #[must_use]
    pub const fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

#[async_trait]
impl WorkflowExecutor for SubprocessWorkflowExecutor {
    async fn run(
        &self,
        issue_id: IssueId,
        description: &str,
    ) -> WorkflowExecutorResult<WorkflowOutcome> {
        let mut command = Command::new(&self.program);
        command
            .arg(issue_id.value().to_string())
            .arg(description)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| {
            WorkflowExecutorError::Spawn {
                command: self.program.display().to_string(),
                source,
            }
        })?;

        // Drain both pipes in the background so a chatty workflow cannot
        // deadlock against a full pipe buffer while we wait on it.
        let stdout_lines = drain_lines(child.stdout.take());
        let stderr_lines = drain_lines(child.stderr.take());

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(wait_result) => {
                let exit_status = wait_result?;
                Ok(WorkflowOutcome::Exited {
                    exit_code: exit_status.code(),
                    stdout: collect(stdout_lines).await,
                    stderr: collect(stderr_lines).await,
                })
            }
            Err(_elapsed) => {
                if let Err(err) = child.kill().await {
                    warn!(issue_id = %issue_id, error = %err, "failed to kill timed-out workflow subprocess");
                }
                Ok(WorkflowOutcome::TimedOut {
                    stdout: collect(stdout_lines).await,
                    stderr: collect(stderr_lines).await,
                })
            }
        }
    }
}

/// Collects a pipe's lines into one newline-joined buffer.
fn drain_lines<R>(reader: Option<R>) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut collected = String::new();
        let Some(reader) = reader else {
            return collected;
        };
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !collected.is_empty() {
                collected.push('\n');
            }
            collected.push_str(&line);
        }
        collected
    })
}

async fn collect(handle: JoinHandle<String>) -> String {
    handle.await.unwrap_or_default()
}
