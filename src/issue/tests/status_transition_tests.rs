//! Exhaustive checks of the issue status state machine.

use crate::issue::domain::{Issue, IssueId, IssueStatus, WorkerId};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[case(IssueStatus::Pending, IssueStatus::Pending, false)]
#[case(IssueStatus::Pending, IssueStatus::Started, true)]
#[case(IssueStatus::Pending, IssueStatus::Completed, false)]
#[case(IssueStatus::Started, IssueStatus::Pending, true)]
#[case(IssueStatus::Started, IssueStatus::Started, false)]
#[case(IssueStatus::Started, IssueStatus::Completed, true)]
#[case(IssueStatus::Completed, IssueStatus::Pending, false)]
#[case(IssueStatus::Completed, IssueStatus::Started, false)]
#[case(IssueStatus::Completed, IssueStatus::Completed, false)]
fn transition_table_is_exact(
    #[case] from: IssueStatus,
    #[case] to: IssueStatus,
    #[case] permitted: bool,
) {
    assert_eq!(from.can_transition_to(to), permitted);
}

#[rstest]
#[case(IssueStatus::Pending, false)]
#[case(IssueStatus::Started, false)]
#[case(IssueStatus::Completed, true)]
fn only_completed_is_terminal(#[case] status: IssueStatus, #[case] terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[rstest]
fn completed_issue_rejects_every_further_transition() {
    let mut issue = Issue::pending(
        IssueId::new(1),
        "archive stale sessions",
        Some(WorkerId::Alleycat1),
        &DefaultClock,
    );
    issue
        .start(WorkerId::Alleycat1, &DefaultClock)
        .and_then(|()| issue.complete(&DefaultClock))
        .unwrap_or_else(|err| panic!("setup failed: {err}"));

    assert!(issue.start(WorkerId::Alleycat1, &DefaultClock).is_err());
    assert!(issue.release(&DefaultClock).is_err());
    assert!(issue.complete(&DefaultClock).is_err());
    assert_eq!(issue.status(), IssueStatus::Completed);
}
