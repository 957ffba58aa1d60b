//! Worker module tests.

mod config_tests;
#[cfg(unix)]
mod executor_tests;
#[cfg(unix)]
mod shutdown_tests;
