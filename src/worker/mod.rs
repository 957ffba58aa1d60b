//! Worker-side orchestration for the Cape issue daemon.
//!
//! Configuration and startup validation in [`config`], the workflow
//! executor port and subprocess adapter in [`executor`], the log pipeline
//! in [`logging`], the poll loop itself in [`service`], and termination
//! signal handling in [`shutdown`].

pub mod config;
pub mod executor;
pub mod logging;
pub mod service;
pub mod shutdown;

#[cfg(test)]
mod tests;
