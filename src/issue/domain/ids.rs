//! Identifier types for the issue domain.

use super::ParseWorkerIdError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an issue record, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(i64);

impl IssueId {
    /// Creates an issue identifier from a store-assigned value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed, pre-registered identity of one deployed worker process.
///
/// Identities double as the claim filter and as the `assigned_to` audit
/// trail, so the set is closed at deploy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerId {
    /// The `alleycat-1` worker instance.
    #[serde(rename = "alleycat-1")]
    Alleycat1,
    /// The `tydirium-1` worker instance.
    #[serde(rename = "tydirium-1")]
    Tydirium1,
}

impl WorkerId {
    /// Returns the identity in canonical storage format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alleycat1 => "alleycat-1",
            Self::Tydirium1 => "tydirium-1",
        }
    }
}

impl TryFrom<&str> for WorkerId {
    type Error = ParseWorkerIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "alleycat-1" => Ok(Self::Alleycat1),
            "tydirium-1" => Ok(Self::Tydirium1),
            _ => Err(ParseWorkerIdError(value.to_owned())),
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
