//! Worker configuration and startup validation.
//!
//! Configuration is constructed once at process startup and is immutable
//! thereafter; any invalid value fails construction so the daemon never
//! enters the poll loop with bad state.

use crate::issue::domain::{ParseWorkerIdError, WorkerId};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Log severity accepted on the command line.
///
/// The set matches the original deployment's severity levels; `CRITICAL`
/// has no tracing counterpart and folds into [`tracing::Level::ERROR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Diagnostic detail, including per-poll "no work" events.
    Debug,
    /// Normal operational events (claims, completions).
    Info,
    /// Transient conditions such as store connectivity loss.
    Warning,
    /// Workflow failures, timeouts, and finalize errors.
    Error,
    /// Alias for [`LogLevel::Error`], kept for deployment compatibility.
    Critical,
}

impl LogLevel {
    /// Returns the canonical configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns the tracing level this severity maps onto.
    #[must_use]
    pub const fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = WorkerConfigError;

    fn try_from(value: &str) -> Result<Self, WorkerConfigError> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(WorkerConfigError::UnknownLogLevel(value.to_owned())),
        }
    }
}

/// Errors raised during startup validation. All of them are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerConfigError {
    /// The worker identity is not part of the deployed set.
    #[error(transparent)]
    UnknownWorkerId(#[from] ParseWorkerIdError),

    /// The poll interval must be a positive number of seconds.
    #[error("poll interval must be a positive number of seconds, got {0}")]
    NonPositivePollInterval(i64),

    /// The workflow timeout must be a positive number of seconds.
    #[error("workflow timeout must be a positive number of seconds, got {0}")]
    NonPositiveWorkflowTimeout(i64),

    /// The shutdown grace period must be a positive number of seconds.
    #[error("shutdown grace period must be a positive number of seconds, got {0}")]
    NonPositiveShutdownGrace(i64),

    /// The log level is not one of the recognised severities.
    #[error("unknown log level '{0}', expected DEBUG, INFO, WARNING, ERROR, or CRITICAL")]
    UnknownLogLevel(String),

    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {0}")]
    MissingEnvironment(&'static str),

    /// The store URL cannot carry the service credential.
    #[error("invalid store URL '{0}', expected scheme://user@host/database")]
    InvalidStoreUrl(String),
}

/// Immutable worker configuration, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    worker_id: WorkerId,
    poll_interval: Duration,
    workflow_timeout: Duration,
    shutdown_grace: Duration,
    log_level: LogLevel,
}

impl WorkerConfig {
    /// Default delay between claim attempts, in seconds.
    pub const DEFAULT_POLL_INTERVAL_SECONDS: i64 = 10;

    /// Default hard wall-clock limit for one workflow execution, in seconds.
    pub const DEFAULT_WORKFLOW_TIMEOUT_SECONDS: i64 = 3600;

    /// Default time an in-flight workflow is given to finish once shutdown
    /// has been requested, in seconds.
    pub const DEFAULT_SHUTDOWN_GRACE_SECONDS: i64 = 30;

    /// Validates raw startup parameters into an immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkerConfigError`] for an unknown worker identity, a
    /// non-positive interval, timeout, or grace period, or an unrecognised
    /// log level.
    pub fn new(
        worker_id: &str,
        poll_interval_seconds: i64,
        workflow_timeout_seconds: i64,
        shutdown_grace_seconds: i64,
        log_level: &str,
    ) -> Result<Self, WorkerConfigError> {
        let identity = WorkerId::try_from(worker_id)?;
        let poll_interval = positive_seconds(poll_interval_seconds)
            .ok_or(WorkerConfigError::NonPositivePollInterval(
                poll_interval_seconds,
            ))?;
        let workflow_timeout = positive_seconds(workflow_timeout_seconds).ok_or(
            WorkerConfigError::NonPositiveWorkflowTimeout(workflow_timeout_seconds),
        )?;
        let shutdown_grace = positive_seconds(shutdown_grace_seconds).ok_or(
            WorkerConfigError::NonPositiveShutdownGrace(shutdown_grace_seconds),
        )?;
        let level = LogLevel::try_from(log_level)?;

        Ok(Self {
            worker_id: identity,
            poll_interval,
            workflow_timeout,
            shutdown_grace,
            log_level: level,
        })
    }

    /// Returns the worker identity used to filter and claim issues.
    #[must_use]
    pub const fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// Returns the delay between claim attempts.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the hard wall-clock limit for one workflow execution.
    #[must_use]
    pub const fn workflow_timeout(&self) -> Duration {
        self.workflow_timeout
    }

    /// Returns the time an in-flight workflow is given to finish once
    /// shutdown has been requested.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }

    /// Returns the configured log severity.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        self.log_level
    }
}

fn positive_seconds(value: i64) -> Option<Duration> {
    if value <= 0 {
        return None;
    }
    u64::try_from(value).ok().map(Duration::from_secs)
}

/// Store connection parameters read from the process environment.
///
/// Both variables are required before the first poll attempt; the service
/// credential is spliced into the connection URL as the password of its
/// user component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    url: String,
    service_key: String,
}

impl StoreConfig {
    /// Environment variable carrying the store URL.
    pub const URL_ENV: &'static str = "CAPE_STORE_URL";

    /// Environment variable carrying the service credential.
    pub const SERVICE_KEY_ENV: &'static str = "CAPE_STORE_SERVICE_KEY";

    /// Creates a store configuration from explicit values.
    #[must_use]
    pub const fn new(url: String, service_key: String) -> Self {
        Self { url, service_key }
    }

    /// Reads the store configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerConfigError::MissingEnvironment`] naming the first
    /// absent or empty variable.
    pub fn from_env() -> Result<Self, WorkerConfigError> {
        let url = require_env(Self::URL_ENV)?;
        let service_key = require_env(Self::SERVICE_KEY_ENV)?;
        Ok(Self::new(url, service_key))
    }

    /// Builds the connection URL with the service credential in place.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerConfigError::InvalidStoreUrl`] when the URL has no
    /// scheme or no user component to attach the credential to.
    pub fn connection_url(&self) -> Result<String, WorkerConfigError> {
        let invalid = || WorkerConfigError::InvalidStoreUrl(self.url.clone());
        let (scheme, remainder) = self.url.split_once("://").ok_or_else(invalid)?;
        let (userinfo, host) = remainder.split_once('@').ok_or_else(invalid)?;
        let user = userinfo
            .split_once(':')
            .map_or(userinfo, |(name, _password)| name);
        if scheme.is_empty() || user.is_empty() || host.is_empty() {
            return Err(invalid());
        }
        Ok(format!("{scheme}://{user}:{}@{host}", self.service_key))
    }
}

fn require_env(name: &'static str) -> Result<String, WorkerConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(WorkerConfigError::MissingEnvironment(name)),
    }
}
