//! Cape issue-processing worker.
//!
//! This crate implements the background daemon that drains the shared
//! `cape_issues` store: it polls for pending issues assigned to its worker
//! identity, claims one at a time through the store's atomic locking
//! primitive, dispatches the claimed issue to the external workflow
//! executable, and writes the final status back.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, subprocess)
//!
//! # Modules
//!
//! - [`issue`]: Issue aggregate, status state machine, and store adapters
//! - [`worker`]: Configuration, workflow execution, logging, and the poll loop

pub mod issue;
pub mod worker;
