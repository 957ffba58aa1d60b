//! Tests for termination signal handling.

use crate::worker::shutdown;
use eyre::{Result, ensure};
use rstest::rstest;
use std::process::Command;
use std::time::Duration;

#[rstest]
#[tokio::test]
async fn sigterm_completes_the_termination_future() -> Result<()> {
    let waiter = tokio::spawn(shutdown::wait_for_termination());
    // Give the spawned task time to install the signal listener before the
    // signal is raised.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()?;
    ensure!(status.success(), "kill command failed: {status}");

    tokio::time::timeout(Duration::from_secs(5), waiter).await???;
    Ok(())
}
