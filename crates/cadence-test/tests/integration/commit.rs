//! Commit: idempotency, atomicity and policy.

use std::sync::Arc;
use std::time::Duration;

use cadence_core::config::SchedulingConfig;
use cadence_core::types::{BookingStatus, ConflictPolicy};
use cadence_recur::recur::{EndCondition, RecurrencePattern};
use cadence_service::booking::{CommitRequest, build_preview, commit_preview};
use cadence_service::error::{CommitError, ServiceError, StoreError};
use cadence_test::MemoryStore;
use cadence_test::fixtures::{
    PROVIDER_ID, metadata, monday_afternoon, preview_request, services, slot,
};

fn mwf_six_times() -> RecurrencePattern {
    RecurrencePattern::weekly(1, [1, 3, 5], EndCondition::Occurrences { count: 6 })
}

fn commit_request(policy: ConflictPolicy, allow_unknown: Option<bool>) -> CommitRequest {
    CommitRequest {
        preview: preview_request(monday_afternoon(), mwf_six_times(), 4_500),
        conflict_policy: policy,
        allow_unknown_availability: allow_unknown,
    }
}

#[test_log::test(tokio::test)]
async fn commit_creates_one_booking_per_occurrence() {
    let store = Arc::new(MemoryStore::new());
    let (checker, committer) = services(&store);

    let outcome = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Include, None),
        &SchedulingConfig::default(),
    )
    .await
    .expect("commit");

    assert!(!outcome.deduplicated);
    assert_eq!(outcome.bookings_created, 6);
    assert_eq!(store.series_count(), 1);

    let bookings = store.series_bookings(outcome.series.id);
    assert_eq!(bookings.len(), 6);
    assert!(bookings.windows(2).all(|w| w[0].slot < w[1].slot));
    assert!(bookings.iter().all(|b| b.price_cents == 4_500 && b.duration_minutes == 60));
    assert_eq!(bookings[0].occurrence_index, Some(0));
    assert_eq!(bookings[5].occurrence_index, Some(5));
}

#[test_log::test(tokio::test)]
async fn committing_twice_returns_the_same_series() {
    let store = Arc::new(MemoryStore::new());
    let (checker, committer) = services(&store);
    let request = commit_request(ConflictPolicy::Include, None);
    let config = SchedulingConfig::default();

    let first = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("first commit");
    let second = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("second commit");

    assert_eq!(first.series.id, second.series.id);
    assert!(second.deduplicated);
    assert_eq!(second.bookings_created, 0);
    assert_eq!(store.series_count(), 1);
    assert_eq!(store.booking_count(), 6);
}

#[test_log::test(tokio::test)]
async fn concurrent_equivalent_commits_create_one_series() {
    let store = Arc::new(MemoryStore::new());
    store.delay_inserts(Duration::from_millis(50));
    let (checker, committer) = services(&store);
    let request = commit_request(ConflictPolicy::Include, None);
    let config = SchedulingConfig::default();

    let (a, b) = tokio::join!(
        commit_preview(&checker, &committer, &request, &config),
        commit_preview(&checker, &committer, &request, &config),
    );

    let results = [a, b];
    let created = results
        .iter()
        .filter(|r| matches!(r, Ok(outcome) if !outcome.deduplicated))
        .count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::Commit(CommitError::InFlight))))
        .count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 1);
    assert_eq!(store.series_count(), 1);

    // once the first commit finished, a retry deduplicates
    let retry = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("retry");
    assert!(retry.deduplicated);
    assert_eq!(store.series_count(), 1);
}

#[test_log::test(tokio::test)]
async fn failed_booking_insert_persists_nothing() {
    let store = Arc::new(MemoryStore::new());
    store.fail_insert_at(Some(3));
    let (checker, committer) = services(&store);
    let request = commit_request(ConflictPolicy::Include, None);
    let config = SchedulingConfig::default();

    let result = commit_preview(&checker, &committer, &request, &config).await;

    assert!(matches!(
        result,
        Err(ServiceError::Commit(CommitError::Storage(StoreError::Unavailable(_))))
    ));
    assert_eq!(store.series_count(), 0);
    assert_eq!(store.booking_count(), 0);

    // the key is released, so the commit can be retried
    store.fail_insert_at(None);
    let retry = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("retry succeeds");
    assert_eq!(retry.bookings_created, 6);
}

#[test_log::test(tokio::test)]
async fn exclude_policy_drops_conflicting_occurrences() {
    let store = Arc::new(MemoryStore::new());
    store.add_booking(PROVIDER_ID, slot(2026, 3, 4, 13, 30), 60, BookingStatus::Confirmed);
    let (checker, committer) = services(&store);
    let config = SchedulingConfig::default();

    let outcome = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Exclude, None),
        &config,
    )
    .await
    .expect("commit");

    assert_eq!(outcome.bookings_created, 5);
    let dates: Vec<_> = store
        .series_bookings(outcome.series.id)
        .iter()
        .map(|b| b.slot.date)
        .collect();
    assert!(!dates.contains(&slot(2026, 3, 4, 0, 0).date));
}

#[test_log::test(tokio::test)]
async fn include_policy_keeps_conflicting_occurrences() {
    let store = Arc::new(MemoryStore::new());
    store.add_booking(PROVIDER_ID, slot(2026, 3, 4, 13, 30), 60, BookingStatus::Confirmed);
    let (checker, committer) = services(&store);

    let outcome = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Include, None),
        &SchedulingConfig::default(),
    )
    .await
    .expect("commit");

    assert_eq!(outcome.bookings_created, 6);
}

#[test_log::test(tokio::test)]
async fn changing_the_conflict_policy_is_a_new_request() {
    let store = Arc::new(MemoryStore::new());
    store.add_booking(PROVIDER_ID, slot(2026, 3, 4, 13, 30), 60, BookingStatus::Confirmed);
    let (checker, committer) = services(&store);
    let config = SchedulingConfig::default();

    let excluded = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Exclude, None),
        &config,
    )
    .await
    .expect("exclude commit");
    assert_eq!(excluded.bookings_created, 5);

    let included = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Include, None),
        &config,
    )
    .await
    .expect("include commit");

    assert!(!included.deduplicated);
    assert_ne!(included.series.id, excluded.series.id);
    assert_eq!(included.bookings_created, 6);
    assert_eq!(store.series_bookings(included.series.id).len(), 6);
    assert_eq!(store.series_count(), 2);
}

#[test_log::test(tokio::test)]
async fn unknown_availability_can_be_refused() {
    let store = Arc::new(MemoryStore::new());
    store.fail_availability(true);
    let (checker, committer) = services(&store);
    let config = SchedulingConfig::default();

    let refused = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Include, Some(false)),
        &config,
    )
    .await;
    assert!(matches!(refused, Err(ServiceError::ValidationError(_))));
    assert_eq!(store.series_count(), 0);

    // the configured default allows it
    let allowed = commit_preview(
        &checker,
        &committer,
        &commit_request(ConflictPolicy::Include, None),
        &config,
    )
    .await
    .expect("commit");
    assert_eq!(allowed.bookings_created, 6);
}

#[test_log::test(tokio::test)]
async fn excluding_every_occurrence_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    // an all-day booking blocks the only occurrence
    store.add_booking(PROVIDER_ID, slot(2026, 3, 2, 0, 0), 1_440, BookingStatus::Pending);
    let (checker, committer) = services(&store);
    let mut request = commit_request(ConflictPolicy::Exclude, None);
    request.preview.pattern = RecurrencePattern::daily(1, EndCondition::Occurrences { count: 1 });

    let result =
        commit_preview(&checker, &committer, &request, &SchedulingConfig::default()).await;

    assert!(matches!(
        result,
        Err(ServiceError::Commit(CommitError::Rejected(_)))
    ));
    assert_eq!(store.series_count(), 0);
}

#[test_log::test(tokio::test)]
async fn committer_writes_conflicts_it_is_given() {
    let store = Arc::new(MemoryStore::new());
    store.add_booking(PROVIDER_ID, monday_afternoon(), 60, BookingStatus::Confirmed);
    let (checker, committer) = services(&store);
    let request = preview_request(monday_afternoon(), mwf_six_times(), 4_500);

    let preview = build_preview(&checker, &request, &SchedulingConfig::default())
        .await
        .expect("preview");
    assert_eq!(preview.totals.conflict_count, 1);

    let outcome = committer
        .commit(
            &request.pattern,
            request.start,
            &preview.occurrences,
            &metadata(4_500),
        )
        .await
        .expect("commit");
    assert_eq!(outcome.bookings_created, 6);

    let stored = committer
        .get_series(outcome.series.id)
        .await
        .expect("lookup")
        .expect("series exists");
    assert_eq!(stored.pattern, mwf_six_times());
    assert_eq!(stored.booking_count, 6);
}
