//! Process termination signals feeding the worker's shutdown flag.

use std::io;

/// Completes when the process receives an interrupt (ctrl-c) or a
/// supervisor termination signal (`SIGTERM`).
///
/// # Errors
///
/// Returns the underlying [`io::Error`] when a signal listener cannot be
/// installed.
#[cfg(unix)]
pub async fn wait_for_termination() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

/// Completes when the process receives an interrupt (ctrl-c).
#[cfg(not(unix))]
pub async fn wait_for_termination() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}
