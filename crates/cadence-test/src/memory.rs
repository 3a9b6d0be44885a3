//! In-memory `AvailabilitySource` and `SeriesStore`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use futures::future::BoxFuture;
use uuid::Uuid;

use cadence_core::types::BookingStatus;
use cadence_recur::recur::{BusyInterval, ScheduledSlot};
use cadence_service::booking::{
    AvailabilitySource, InsertOutcome, NewSeries, SeriesStore, StoredSeries,
};
use cadence_service::error::{StoreError, StoreResult};

/// A booking row held by `MemoryStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBooking {
    pub id: Uuid,
    pub series_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub slot: ScheduledSlot,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub status: BookingStatus,
    pub occurrence_index: Option<usize>,
}

impl MemoryBooking {
    fn busy_interval(&self) -> Option<BusyInterval> {
        if !self.status.is_busy() {
            return None;
        }
        let end = self
            .slot
            .ends_at(TimeDelta::minutes(i64::from(self.duration_minutes)))?;
        Some(BusyInterval::new(self.slot.starts_at(), end))
    }
}

#[derive(Debug, Default)]
struct State {
    series: Vec<StoredSeries>,
    bookings: Vec<MemoryBooking>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    fail_availability: bool,
    fail_insert_at: Option<usize>,
    insert_delay: Option<Duration>,
}

/// Store backed by plain collections, with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    availability_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing booking that is not part of any series.
    pub fn add_booking(
        &self,
        provider_id: Uuid,
        slot: ScheduledSlot,
        duration_minutes: u32,
        status: BookingStatus,
    ) -> Uuid {
        let id = Uuid::now_v7();
        lock(&self.state).bookings.push(MemoryBooking {
            id,
            series_id: None,
            provider_id,
            slot,
            duration_minutes,
            price_cents: 0,
            status,
            occurrence_index: None,
        });
        id
    }

    /// Makes every availability lookup fail.
    pub fn fail_availability(&self, fail: bool) {
        lock(&self.faults).fail_availability = fail;
    }

    /// Makes series inserts fail while writing the booking at `index`.
    pub fn fail_insert_at(&self, index: Option<usize>) {
        lock(&self.faults).fail_insert_at = index;
    }

    /// Delays every series insert, widening the window for concurrent commits.
    pub fn delay_inserts(&self, delay: Duration) {
        lock(&self.faults).insert_delay = Some(delay);
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        lock(&self.state).series.len()
    }

    #[must_use]
    pub fn booking_count(&self) -> usize {
        lock(&self.state).bookings.len()
    }

    /// Bookings of a series ordered by occurrence index.
    #[must_use]
    pub fn series_bookings(&self, series_id: Uuid) -> Vec<MemoryBooking> {
        let mut bookings: Vec<MemoryBooking> = lock(&self.state)
            .bookings
            .iter()
            .filter(|b| b.series_id == Some(series_id))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.occurrence_index);
        bookings
    }

    #[must_use]
    pub fn availability_calls(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }

    fn stage_bookings(
        series_id: Uuid,
        series: &NewSeries,
        fail_at: Option<usize>,
    ) -> StoreResult<Vec<MemoryBooking>> {
        series
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                if fail_at == Some(index) {
                    return Err(StoreError::Unavailable(format!(
                        "injected failure writing booking {index}"
                    )));
                }
                Ok(MemoryBooking {
                    id: Uuid::now_v7(),
                    series_id: Some(series_id),
                    provider_id: series.metadata.provider_id,
                    slot: *slot,
                    duration_minutes: series.metadata.duration_minutes,
                    price_cents: series.metadata.unit_price_cents,
                    status: BookingStatus::Pending,
                    occurrence_index: Some(index),
                })
            })
            .collect()
    }
}

impl AvailabilitySource for MemoryStore {
    fn busy_intervals(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<BusyInterval>>> {
        Box::pin(async move {
            self.availability_calls.fetch_add(1, Ordering::SeqCst);
            if lock(&self.faults).fail_availability {
                return Err(StoreError::Unavailable(
                    "availability lookup timed out".to_string(),
                ));
            }
            Ok(lock(&self.state)
                .bookings
                .iter()
                .filter(|b| b.provider_id == provider_id)
                .filter(|b| (from..=to).contains(&b.slot.date))
                .filter_map(MemoryBooking::busy_interval)
                .collect())
        })
    }
}

impl SeriesStore for MemoryStore {
    fn insert_series<'a>(
        &'a self,
        series: &'a NewSeries,
    ) -> BoxFuture<'a, StoreResult<InsertOutcome>> {
        Box::pin(async move {
            let faults = *lock(&self.faults);
            if let Some(delay) = faults.insert_delay {
                tokio::time::sleep(delay).await;
            }

            // Rows are staged first so a failure leaves nothing behind
            let series_id = Uuid::now_v7();
            let staged = Self::stage_bookings(series_id, series, faults.fail_insert_at)?;

            let mut state = lock(&self.state);
            if let Some(existing) = state
                .series
                .iter()
                .find(|s| s.idempotency_key == series.idempotency_key)
            {
                return Ok(InsertOutcome::Existing(existing.clone()));
            }

            let stored = StoredSeries {
                id: series_id,
                idempotency_key: series.idempotency_key.clone(),
                metadata: series.metadata,
                pattern: series.pattern.clone(),
                start: series.start,
                booking_count: staged.len(),
                created_at: Utc::now(),
            };
            state.series.push(stored.clone());
            state.bookings.extend(staged);
            tracing::debug!(series_id = %series_id, "Stored series in memory");

            Ok(InsertOutcome::Created(stored))
        })
    }

    fn find_by_key<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<StoredSeries>>> {
        Box::pin(async move {
            Ok(lock(&self.state)
                .series
                .iter()
                .find(|s| s.idempotency_key == key)
                .cloned())
        })
    }

    fn get_series(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<StoredSeries>>> {
        Box::pin(async move {
            Ok(lock(&self.state)
                .series
                .iter()
                .find(|s| s.id == id)
                .cloned())
        })
    }
}
