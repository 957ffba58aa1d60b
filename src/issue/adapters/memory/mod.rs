//! In-memory adapters for issue lifecycle tests.

mod issue;

pub use issue::InMemoryIssueRepository;
