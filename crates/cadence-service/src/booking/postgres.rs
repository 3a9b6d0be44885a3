//! Postgres-backed availability and series storage.

use chrono::NaiveDate;
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use futures::future::BoxFuture;
use uuid::Uuid;

use cadence_db::db::DbProvider;
use cadence_db::db::connection::DbPool;
use cadence_db::db::enums::{BookingStatus, SeriesFrequency};
use cadence_db::db::map::booking::{BookingTemplate, booking_rows, busy_interval};
use cadence_db::db::query::{booking, series as series_query};
use cadence_db::error::DbError;
use cadence_db::model::series::{NewRecurringSeries, RecurringSeries};
use cadence_recur::recur::{BusyInterval, ScheduledSlot};

use super::availability::AvailabilitySource;
use super::store::{InsertOutcome, NewSeries, SeriesMetadata, SeriesStore, StoredSeries};
use crate::error::{StoreError, StoreResult};

/// Reads busy time from the provider's non-cancelled bookings.
#[derive(Clone)]
pub struct PgAvailabilitySource {
    pool: DbPool,
}

impl PgAvailabilitySource {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AvailabilitySource for PgAvailabilitySource {
    #[tracing::instrument(skip(self))]
    fn busy_intervals(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<BusyInterval>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            let bookings = booking::load_busy_for_provider(&mut conn, provider_id, from, to).await?;
            Ok(bookings.iter().filter_map(busy_interval).collect())
        })
    }
}

/// Writes each series and its bookings in one transaction.
#[derive(Clone)]
pub struct PgSeriesStore {
    pool: DbPool,
}

impl PgSeriesStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SeriesStore for PgSeriesStore {
    #[tracing::instrument(skip_all, fields(slot_count = series.slots.len()))]
    fn insert_series<'a>(&'a self, series: &'a NewSeries) -> BoxFuture<'a, StoreResult<InsertOutcome>> {
        Box::pin(async move {
            let series_id = Uuid::now_v7();
            let duration_minutes = i32::try_from(series.metadata.duration_minutes)
                .map_err(|_| StoreError::Constraint("duration out of range".to_string()))?;
            let occurrence_count = i32::try_from(series.slots.len())
                .map_err(|_| StoreError::Constraint("too many occurrences".to_string()))?;

            let new_series = NewRecurringSeries {
                id: series_id,
                idempotency_key: &series.idempotency_key,
                provider_id: series.metadata.provider_id,
                customer_id: series.metadata.customer_id,
                listing_id: series.metadata.listing_id,
                frequency: SeriesFrequency::from(series.pattern.frequency),
                pattern: serde_json::to_value(&series.pattern).map_err(DbError::from)?,
                start_date: series.start.date,
                start_time: series.start.time,
                duration_minutes,
                unit_price_cents: series.metadata.unit_price_cents,
                occurrence_count,
            };
            let template = BookingTemplate {
                series_id,
                provider_id: series.metadata.provider_id,
                customer_id: series.metadata.customer_id,
                listing_id: series.metadata.listing_id,
                duration_minutes,
                price_cents: series.metadata.unit_price_cents,
                status: BookingStatus::Pending,
            };
            let rows = booking_rows(&template, &series.slots)?;

            let mut conn = self.pool.get_connection().await?;
            let new_series_ref = &new_series;
            let rows_ref = &rows;
            let inserted = conn
                .transaction::<_, DbError, _>(move |tx| {
                    async move {
                        let stored = series_query::insert(tx, new_series_ref).await?;
                        let written = booking::insert_batch(tx, rows_ref).await?;
                        tracing::debug!(series_id = %stored.id, written, "Inserted series bookings");
                        Ok(stored)
                    }
                    .scope_boxed()
                })
                .await;

            match inserted {
                Ok(row) => Ok(InsertOutcome::Created(stored_series(&row)?)),
                Err(e) if e.is_unique_violation() => {
                    tracing::info!("Idempotency key already committed by another writer");
                    let existing =
                        series_query::by_idempotency_key(&mut conn, &series.idempotency_key).await?;
                    match existing {
                        Some(row) => Ok(InsertOutcome::Existing(stored_series(&row)?)),
                        None => Err(e.into()),
                    }
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    #[tracing::instrument(skip_all)]
    fn find_by_key<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<StoredSeries>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            series_query::by_idempotency_key(&mut conn, key)
                .await?
                .as_ref()
                .map(stored_series)
                .transpose()
        })
    }

    #[tracing::instrument(skip(self))]
    fn get_series(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<StoredSeries>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            series_query::by_id(&mut conn, id)
                .await?
                .as_ref()
                .map(stored_series)
                .transpose()
        })
    }
}

/// ## Summary
/// Converts a stored row back into a `StoredSeries`.
///
/// ## Errors
/// Returns an error if the stored pattern or counts no longer decode.
pub fn stored_series(row: &RecurringSeries) -> StoreResult<StoredSeries> {
    Ok(StoredSeries {
        id: row.id,
        idempotency_key: row.idempotency_key.clone(),
        metadata: SeriesMetadata {
            provider_id: row.provider_id,
            customer_id: row.customer_id,
            listing_id: row.listing_id,
            duration_minutes: u32::try_from(row.duration_minutes)
                .map_err(|_| StoreError::Constraint("stored duration is negative".to_string()))?,
            unit_price_cents: row.unit_price_cents,
        },
        pattern: row.recurrence_pattern()?,
        start: ScheduledSlot::new(row.start_date, row.start_time),
        booking_count: usize::try_from(row.occurrence_count)
            .map_err(|_| StoreError::Constraint("stored occurrence count is negative".to_string()))?,
        created_at: row.created_at,
    })
}
