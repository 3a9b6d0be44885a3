//! Persistence seam for committed series.

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use uuid::Uuid;

use cadence_recur::recur::{RecurrencePattern, ScheduledSlot};

use crate::error::StoreResult;

/// Who and what a series books, and at what price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMetadata {
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub duration_minutes: u32,
    /// Price of a single occurrence, in minor currency units.
    pub unit_price_cents: i64,
}

impl SeriesMetadata {
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.duration_minutes))
    }
}

/// A series ready to be written, with one slot per booking to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeries {
    pub idempotency_key: String,
    pub metadata: SeriesMetadata,
    pub pattern: RecurrencePattern,
    pub start: ScheduledSlot,
    pub slots: Vec<ScheduledSlot>,
}

/// A committed series as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSeries {
    pub id: Uuid,
    pub idempotency_key: String,
    pub metadata: SeriesMetadata,
    pub pattern: RecurrencePattern,
    pub start: ScheduledSlot,
    pub booking_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Result of `SeriesStore::insert_series`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(StoredSeries),
    /// Another writer committed the same idempotency key first.
    Existing(StoredSeries),
}

/// Transactional storage for series and their bookings.
pub trait SeriesStore: Send + Sync {
    /// ## Summary
    /// Writes the series and one booking per slot as a single atomic unit.
    ///
    /// When the idempotency key is already taken nothing is written and the
    /// existing series is returned instead.
    ///
    /// ## Errors
    /// Returns an error if the write fails; no partial series remains.
    fn insert_series<'a>(&'a self, series: &'a NewSeries) -> BoxFuture<'a, StoreResult<InsertOutcome>>;

    /// ## Errors
    /// Returns an error if the lookup fails.
    fn find_by_key<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult<Option<StoredSeries>>>;

    /// ## Errors
    /// Returns an error if the lookup fails.
    fn get_series(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<StoredSeries>>>;
}
