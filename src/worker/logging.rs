//! Log pipeline: console plus rotating per-worker file.
//!
//! Each line follows the store's operational convention,
//! `TIMESTAMP - worker_<id> - LEVEL - message`, on both targets. The file
//! target rotates daily under the log directory; the active file carries
//! the rotation date, `worker_<worker-id>.<date>.log`.

use crate::worker::config::WorkerConfig;
use chrono::Utc;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Errors raised while initialising the log pipeline.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The rotating log file could not be created.
    #[error("failed to create log file: {0}")]
    File(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the non-blocking file writer flushing; drop only at process exit.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Event format producing `TIMESTAMP - worker_<id> - LEVEL - message`.
#[derive(Debug, Clone)]
struct WorkerLogFormat {
    worker: String,
}

impl<S, N> FormatEvent<S, N> for WorkerLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        write!(
            writer,
            "{timestamp} - worker_{} - {} - ",
            self.worker,
            level_label(event.metadata().level()),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Maps tracing levels onto the deployment's severity names.
fn level_label(level: &Level) -> &'static str {
    if *level == Level::WARN {
        "WARNING"
    } else {
        level.as_str()
    }
}

/// Installs the global log subscriber for this worker process.
///
/// Events go to both standard output and a daily-rotating file under
/// `log_dir`, named `worker_<worker-id>.<date>.log`. The returned guard
/// must be held for the lifetime of the process so buffered file output is
/// flushed on exit.
///
/// # Errors
///
/// Returns [`LoggingError`] when the log file cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &WorkerConfig, log_dir: impl AsRef<Path>) -> Result<LogGuard, LoggingError> {
    let format = WorkerLogFormat {
        worker: config.worker_id().as_str().to_owned(),
    };

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(format!("worker_{}", config.worker_id()))
        .filename_suffix("log")
        .build(log_dir)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(config.log_level().as_tracing()))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format.clone())
                .with_writer(std::io::stdout),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(file_writer),
        )
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::level_label;
    use tracing::Level;

    #[test]
    fn level_label_uses_deployment_severity_names() {
        assert_eq!(level_label(&Level::WARN), "WARNING");
        assert_eq!(level_label(&Level::ERROR), "ERROR");
        assert_eq!(level_label(&Level::DEBUG), "DEBUG");
    }
}
