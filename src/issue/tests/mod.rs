//! Issue module tests.

mod domain_tests;
mod status_transition_tests;
