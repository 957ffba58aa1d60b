//! Tests for issue domain types and lifecycle methods.

use crate::issue::domain::{
    Issue, IssueDomainError, IssueId, IssueStatus, PersistedIssueData, WorkerId,
};
use chrono::{TimeZone, Utc};
use eyre::{Result, bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;

fn pending_issue(id: i64, worker: Option<WorkerId>) -> Issue {
    Issue::pending(IssueId::new(id), "triage flaky pipeline", worker, &DefaultClock)
}

#[rstest]
#[case("alleycat-1", WorkerId::Alleycat1)]
#[case("tydirium-1", WorkerId::Tydirium1)]
#[case("  ALLEYCAT-1  ", WorkerId::Alleycat1)]
#[case("Tydirium-1", WorkerId::Tydirium1)]
fn worker_id_parses_known_identities(#[case] raw: &str, #[case] expected: WorkerId) -> Result<()> {
    let parsed = WorkerId::try_from(raw)
        .map_err(|err| eyre::eyre!("expected '{raw}' to parse: {err}"))?;
    ensure!(parsed == expected, "parsed {parsed}, expected {expected}");
    Ok(())
}

#[rstest]
#[case("")]
#[case("alleycat-2")]
#[case("tydirium")]
#[case("worker-1")]
fn worker_id_rejects_unknown_identities(#[case] raw: &str) {
    assert!(WorkerId::try_from(raw).is_err());
}

#[rstest]
#[case("pending", IssueStatus::Pending)]
#[case("STARTED", IssueStatus::Started)]
#[case(" completed ", IssueStatus::Completed)]
fn status_parses_canonical_and_noisy_forms(
    #[case] raw: &str,
    #[case] expected: IssueStatus,
) -> Result<()> {
    let parsed = IssueStatus::try_from(raw)
        .map_err(|err| eyre::eyre!("expected '{raw}' to parse: {err}"))?;
    ensure!(parsed == expected, "parsed {parsed}, expected {expected}");
    Ok(())
}

#[rstest]
#[case("failed")]
#[case("done")]
#[case("")]
fn status_rejects_values_outside_the_closed_set(#[case] raw: &str) {
    assert!(IssueStatus::try_from(raw).is_err());
}

#[rstest]
fn start_claims_a_pending_issue() -> Result<()> {
    let mut issue = pending_issue(7, Some(WorkerId::Alleycat1));
    let created = issue.created_at();

    issue.start(WorkerId::Alleycat1, &DefaultClock)?;

    ensure!(issue.status() == IssueStatus::Started, "status not started");
    ensure!(
        issue.assigned_to() == Some(WorkerId::Alleycat1),
        "assignment lost on start"
    );
    ensure!(
        issue.updated_at() >= created,
        "updated_at went backwards on start"
    );
    Ok(())
}

#[rstest]
fn complete_requires_a_started_issue() {
    let mut issue = pending_issue(8, Some(WorkerId::Tydirium1));

    let Err(IssueDomainError::InvalidStatusTransition { from, to, .. }) =
        issue.complete(&DefaultClock)
    else {
        panic!("pending issue must not complete directly");
    };
    assert_eq!(from, IssueStatus::Pending);
    assert_eq!(to, IssueStatus::Completed);
}

#[rstest]
fn release_retains_the_worker_assignment() -> Result<()> {
    let mut issue = pending_issue(9, Some(WorkerId::Tydirium1));
    issue.start(WorkerId::Tydirium1, &DefaultClock)?;

    issue.release(&DefaultClock)?;

    ensure!(issue.status() == IssueStatus::Pending, "release must restore pending");
    ensure!(
        issue.assigned_to() == Some(WorkerId::Tydirium1),
        "release must keep the assignment for retry"
    );
    Ok(())
}

#[rstest]
fn from_persisted_round_trips_all_fields() -> Result<()> {
    let Some(created_at) = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).single() else {
        bail!("invalid fixture timestamp");
    };
    let Some(updated_at) = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).single() else {
        bail!("invalid fixture timestamp");
    };
    let issue = Issue::from_persisted(PersistedIssueData {
        id: IssueId::new(42),
        description: "Fix bug".to_owned(),
        title: Some("Login failure".to_owned()),
        status: IssueStatus::Started,
        assigned_to: Some(WorkerId::Alleycat1),
        created_at,
        updated_at,
    });

    ensure!(issue.id() == IssueId::new(42), "id mismatch");
    ensure!(issue.description() == "Fix bug", "description mismatch");
    ensure!(issue.title() == Some("Login failure"), "title mismatch");
    ensure!(issue.status() == IssueStatus::Started, "status mismatch");
    ensure!(
        issue.assigned_to() == Some(WorkerId::Alleycat1),
        "assignment mismatch"
    );
    ensure!(issue.created_at() == created_at, "created_at mismatch");
    ensure!(issue.updated_at() == updated_at, "updated_at mismatch");
    Ok(())
}

#[rstest]
fn display_forms_match_storage_representation() {
    assert_eq!(WorkerId::Alleycat1.to_string(), "alleycat-1");
    assert_eq!(IssueStatus::Started.to_string(), "started");
    assert_eq!(IssueId::new(42).to_string(), "42");
}
