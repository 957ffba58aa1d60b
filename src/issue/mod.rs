//! Issue lifecycle management for the Cape worker.
//!
//! This module models the unit of work drained by the worker daemon:
//! reconstructing issues from the shared store, enforcing the
//! `pending → started → completed` status machine, and claiming work through
//! the store's atomic locking primitive. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
