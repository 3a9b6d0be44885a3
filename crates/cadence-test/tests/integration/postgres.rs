//! The Postgres stores against a real database.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use uuid::Uuid;

use cadence_core::config::SchedulingConfig;
use cadence_core::types::ConflictPolicy;
use cadence_db::db::DbProvider;
use cadence_db::db::connection::DbPool;
use cadence_db::db::enums::BookingStatus;
use cadence_db::db::query::booking::insert_batch;
use cadence_db::model::booking::NewBooking;
use cadence_recur::recur::{BusyInterval, EndCondition, RecurrencePattern, generate};
use cadence_service::booking::postgres::{PgAvailabilitySource, PgSeriesStore};
use cadence_service::booking::{
    AvailabilitySource, CommitRequest, ConflictChecker, InsertOutcome, NewSeries,
    SeriesCommitter, SeriesMetadata, SeriesStore, commit_preview,
};
use cadence_test::fixtures::{monday_afternoon, preview_request, slot};
use cadence_test::postgres::{execute, test_pool};

async fn pool() -> Option<DbPool> {
    test_pool().await.expect("test database is reachable")
}

fn metadata(provider_id: Uuid) -> SeriesMetadata {
    SeriesMetadata {
        provider_id,
        customer_id: Uuid::now_v7(),
        listing_id: Uuid::now_v7(),
        duration_minutes: 60,
        unit_price_cents: 3_000,
    }
}

fn new_series(provider_id: Uuid, count: u32) -> NewSeries {
    let pattern = RecurrencePattern::weekly(1, [1, 3, 5], EndCondition::Occurrences { count });
    let slots = generate(monday_afternoon(), &pattern, 500)
        .expect("valid pattern")
        .slots;
    NewSeries {
        idempotency_key: format!("test-{}", Uuid::now_v7()),
        metadata: metadata(provider_id),
        pattern,
        start: monday_afternoon(),
        slots,
    }
}

async fn busy(pool: &DbPool, provider_id: Uuid) -> Vec<BusyInterval> {
    PgAvailabilitySource::new(pool.clone())
        .busy_intervals(
            provider_id,
            NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
        )
        .await
        .expect("busy lookup")
}

fn loose_booking(provider_id: Uuid, status: BookingStatus, day: u32) -> NewBooking {
    let at = slot(2026, 3, day, 14, 0);
    NewBooking {
        id: Uuid::now_v7(),
        series_id: None,
        provider_id,
        customer_id: Uuid::now_v7(),
        listing_id: Uuid::now_v7(),
        scheduled_date: at.date,
        start_time: at.time,
        duration_minutes: 60,
        price_cents: 1_000,
        status,
        occurrence_index: None,
    }
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn failed_booking_row_rolls_back_the_series() {
    let Some(pool) = pool().await else { return };
    let provider_id = Uuid::now_v7();
    let constraint = format!("booking_limit_{}", provider_id.simple());

    // the third booking of this provider's series violates a CHECK
    execute(
        &pool,
        &format!(
            "ALTER TABLE booking ADD CONSTRAINT {constraint} \
             CHECK (provider_id <> '{provider_id}' OR occurrence_index < 2) NOT VALID"
        ),
    )
    .await
    .expect("add constraint");

    let store = PgSeriesStore::new(pool.clone());
    let series = new_series(provider_id, 4);
    let result = store.insert_series(&series).await;

    execute(&pool, &format!("ALTER TABLE booking DROP CONSTRAINT {constraint}"))
        .await
        .expect("drop constraint");

    assert!(result.is_err());
    assert!(
        store
            .find_by_key(&series.idempotency_key)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(busy(&pool, provider_id).await.is_empty());

    let retried = store.insert_series(&series).await.expect("retry");
    assert!(matches!(retried, InsertOutcome::Created(ref s) if s.booking_count == 4));
    assert_eq!(busy(&pool, provider_id).await.len(), 4);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn racing_inserts_of_one_key_create_one_series() {
    let Some(pool) = pool().await else { return };
    let provider_id = Uuid::now_v7();
    let store = PgSeriesStore::new(pool.clone());
    let series = new_series(provider_id, 6);

    let (a, b) = tokio::join!(store.insert_series(&series), store.insert_series(&series));
    let outcomes = [a.expect("first insert"), b.expect("second insert")];

    let created: Vec<Uuid> = outcomes
        .iter()
        .filter_map(|o| match o {
            InsertOutcome::Created(s) => Some(s.id),
            InsertOutcome::Existing(_) => None,
        })
        .collect();
    let ids: Vec<Uuid> = outcomes
        .iter()
        .map(|o| match o {
            InsertOutcome::Created(s) | InsertOutcome::Existing(s) => s.id,
        })
        .collect();

    assert_eq!(created.len(), 1);
    assert_eq!(ids[0], ids[1]);
    assert_eq!(busy(&pool, provider_id).await.len(), 6);

    let again = store.insert_series(&series).await.expect("third insert");
    assert!(matches!(again, InsertOutcome::Existing(ref s) if s.id == ids[0]));
    assert_eq!(busy(&pool, provider_id).await.len(), 6);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn busy_lookup_skips_cancelled_bookings() {
    let Some(pool) = pool().await else { return };
    let provider_id = Uuid::now_v7();
    let rows = [
        loose_booking(provider_id, BookingStatus::Cancelled, 2),
        loose_booking(provider_id, BookingStatus::Confirmed, 4),
        loose_booking(Uuid::now_v7(), BookingStatus::Confirmed, 6),
    ];
    {
        let mut conn = pool.get_connection().await.expect("connection");
        assert_eq!(insert_batch(&mut conn, &rows).await.expect("seed"), 3);
    }

    let intervals = busy(&pool, provider_id).await;
    let wednesday = slot(2026, 3, 4, 14, 0).starts_at();
    assert_eq!(
        intervals,
        vec![BusyInterval::new(wednesday, wednesday + TimeDelta::minutes(60))]
    );

    let checker = ConflictChecker::new(Arc::new(PgAvailabilitySource::new(pool.clone())));
    let annotated = checker
        .annotate(
            &[slot(2026, 3, 2, 14, 0), slot(2026, 3, 4, 14, 0), slot(2026, 3, 6, 14, 0)],
            provider_id,
            TimeDelta::minutes(60),
        )
        .await;
    let flags: Vec<bool> = annotated.iter().map(|o| o.has_conflict()).collect();
    assert_eq!(flags, vec![false, true, false]);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn commit_pipeline_persists_and_deduplicates() {
    let Some(pool) = pool().await else { return };
    let provider_id = Uuid::now_v7();
    {
        let mut conn = pool.get_connection().await.expect("connection");
        insert_batch(&mut conn, &[loose_booking(provider_id, BookingStatus::Confirmed, 4)])
            .await
            .expect("seed");
    }
    let checker = ConflictChecker::new(Arc::new(PgAvailabilitySource::new(pool.clone())));
    let committer = SeriesCommitter::new(Arc::new(PgSeriesStore::new(pool.clone())));
    let mut preview = preview_request(
        monday_afternoon(),
        RecurrencePattern::weekly(1, [1, 3, 5], EndCondition::Occurrences { count: 6 }),
        4_500,
    );
    preview.metadata = metadata(provider_id);
    let request = CommitRequest {
        preview,
        conflict_policy: ConflictPolicy::Exclude,
        allow_unknown_availability: Some(false),
    };
    let config = SchedulingConfig::default();

    let first = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("commit");
    assert!(!first.deduplicated);
    assert_eq!(first.bookings_created, 5);
    // the seeded booking plus the five new ones
    assert_eq!(busy(&pool, provider_id).await.len(), 6);

    let repeated = commit_preview(&checker, &committer, &request, &config)
        .await
        .expect("repeat");
    assert!(repeated.deduplicated);
    assert_eq!(repeated.series.id, first.series.id);
    assert_eq!(busy(&pool, provider_id).await.len(), 6);

    let stored = committer
        .get_series(first.series.id)
        .await
        .expect("lookup")
        .expect("series exists");
    assert_eq!(stored.booking_count, 5);
    assert_eq!(stored.metadata, request.preview.metadata);
}
