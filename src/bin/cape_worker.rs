//! Cape worker daemon.
//!
//! Claims issues assigned to one worker identity from the Postgres-backed
//! issue store, runs the workflow executable for each claim, and records
//! the outcome. Runs until interrupted.

use cape_worker::issue::adapters::postgres::PostgresIssueRepository;
use cape_worker::worker::config::{StoreConfig, WorkerConfig};
use cape_worker::worker::executor::SubprocessWorkflowExecutor;
use cape_worker::worker::logging;
use cape_worker::worker::service::WorkerLoop;
use cape_worker::worker::shutdown;
use clap::Parser;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

type BoxError = Box<dyn Error + Send + Sync>;

/// Command-line arguments for the worker daemon.
#[derive(Debug, Parser)]
#[command(name = "cape-worker", about = "Cape issue-processing worker daemon")]
struct Cli {
    /// Worker identity to claim issues under (alleycat-1 or tydirium-1).
    #[arg(long)]
    worker_id: String,

    /// Seconds to wait between claim attempts.
    #[arg(long, default_value_t = WorkerConfig::DEFAULT_POLL_INTERVAL_SECONDS)]
    poll_interval: i64,

    /// Log severity: DEBUG, INFO, WARNING, ERROR, or CRITICAL.
    #[arg(long, default_value = "INFO")]
    log_level: String,

    /// Workflow executable invoked per claimed issue.
    #[arg(long, default_value = "cape-adw")]
    workflow_command: PathBuf,

    /// Hard wall-clock limit for one workflow execution, in seconds.
    #[arg(long, default_value_t = WorkerConfig::DEFAULT_WORKFLOW_TIMEOUT_SECONDS)]
    workflow_timeout: i64,

    /// Seconds an in-flight workflow may keep running after shutdown is
    /// requested before it is force-terminated.
    #[arg(long, default_value_t = WorkerConfig::DEFAULT_SHUTDOWN_GRACE_SECONDS)]
    shutdown_grace: i64,

    /// Directory for the rotating worker log file.
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = WorkerConfig::new(
        &cli.worker_id,
        cli.poll_interval,
        cli.workflow_timeout,
        cli.shutdown_grace,
        &cli.log_level,
    )?;
    let store = StoreConfig::from_env()?;
    let _log_guard = logging::init(&config, &cli.log_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config, store))
}

async fn run(cli: Cli, config: WorkerConfig, store: StoreConfig) -> Result<(), BoxError> {
    let manager = ConnectionManager::<PgConnection>::new(store.connection_url()?);
    // Building the pool opens a first connection, so an unreachable or
    // misconfigured store fails here rather than inside the poll loop.
    let pool = Pool::builder().build(manager)?;
    let repository = Arc::new(PostgresIssueRepository::new(pool));
    let executor = Arc::new(SubprocessWorkflowExecutor::new(
        cli.workflow_command,
        config.workflow_timeout(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if shutdown::wait_for_termination().await.is_ok() {
            info!("termination signal received; finishing current cycle before exit");
            shutdown_tx.send(true).ok();
        }
    });

    let mut worker = WorkerLoop::new(repository, executor, config, shutdown_rx);
    worker.run().await;
    Ok(())
}
