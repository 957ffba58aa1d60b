//! `PostgreSQL` adapters for issue persistence and claiming.

mod models;
mod repository;
mod schema;

pub use repository::{IssuePgPool, PostgresIssueRepository};
