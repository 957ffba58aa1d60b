//! Subprocess executor tests using throwaway shell scripts.

use crate::issue::domain::IssueId;
use crate::worker::executor::{
    SubprocessWorkflowExecutor, WorkflowExecutor, WorkflowExecutorError, WorkflowOutcome,
};
use eyre::{Result, bail, ensure};
use rstest::rstest;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn script(dir: &TempDir, body: &str) -> Result<PathBuf> {
    let path = dir.path().join("workflow.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[rstest]
#[tokio::test]
async fn passes_issue_id_and_description_as_positional_arguments() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script(&dir, "echo \"id=$1\"\necho \"desc=$2\" >&2\nexit 0")?;
    let executor = SubprocessWorkflowExecutor::new(path, Duration::from_secs(5));

    let outcome = executor.run(IssueId::new(42), "Fix bug").await?;

    ensure!(outcome.is_success(), "workflow should succeed: {outcome:?}");
    let WorkflowOutcome::Exited { stdout, stderr, .. } = outcome else {
        bail!("expected Exited outcome");
    };
    ensure!(stdout == "id=42", "stdout was '{stdout}'");
    ensure!(stderr == "desc=Fix bug", "stderr was '{stderr}'");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn reports_a_non_zero_exit_code() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script(&dir, "echo boom >&2\nexit 3")?;
    let executor = SubprocessWorkflowExecutor::new(path, Duration::from_secs(5));

    let outcome = executor.run(IssueId::new(7), "doomed work").await?;

    let WorkflowOutcome::Exited {
        exit_code, stderr, ..
    } = outcome
    else {
        bail!("expected Exited outcome");
    };
    ensure!(exit_code == Some(3), "exit code was {exit_code:?}");
    ensure!(stderr == "boom", "stderr was '{stderr}'");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn kills_a_workflow_that_exceeds_the_timeout() -> Result<()> {
    let dir = TempDir::new()?;
    // Close the pipes before sleeping so output collection sees EOF as soon
    // as the shell itself is killed.
    let path = script(&dir, "echo partial\nexec >/dev/null 2>&1\nsleep 30")?;
    let executor = SubprocessWorkflowExecutor::new(path, Duration::from_millis(300));

    let outcome = executor.run(IssueId::new(9), "slow work").await?;

    let WorkflowOutcome::TimedOut { stdout, .. } = outcome else {
        bail!("expected TimedOut outcome, got {outcome:?}");
    };
    ensure!(stdout == "partial", "partial output lost: '{stdout}'");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let executor = SubprocessWorkflowExecutor::new(
        PathBuf::from("/nonexistent/cape-adw"),
        Duration::from_secs(5),
    );

    let result = executor.run(IssueId::new(1), "unreachable").await;

    assert!(matches!(result, Err(WorkflowExecutorError::Spawn { .. })));
}
