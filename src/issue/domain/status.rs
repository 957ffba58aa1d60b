//! Issue status state machine.

use super::ParseIssueStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue lifecycle status.
///
/// The store's check constraint closes the set over these three values, so
/// failure is represented by releasing a started issue back to
/// [`IssueStatus::Pending`] rather than by a distinct terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Issue is waiting to be claimed by its assigned worker.
    Pending,
    /// Issue has been claimed and the workflow is executing.
    Started,
    /// Issue has been processed successfully.
    Completed,
}

impl IssueStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }

    /// Returns whether the state machine permits moving to `next`.
    ///
    /// Permitted transitions: `pending → started` (claim), `started →
    /// completed` (successful finalize), and `started → pending` (failure
    /// release for retry). Everything else, including self-transitions, is
    /// rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Started)
                | (Self::Started, Self::Completed)
                | (Self::Started, Self::Pending)
        )
    }

    /// Returns whether the status permits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for IssueStatus {
    type Error = ParseIssueStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseIssueStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
