//! Models for the recurring series table.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use cadence_recur::recur::RecurrencePattern;

use crate::db::{enums::SeriesFrequency, schema};
use crate::error::DbResult;

/// Parent record grouping every booking generated from one pattern.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::recurring_series)]
#[diesel(check_for_backend(Pg))]
pub struct RecurringSeries {
    pub id: Uuid,
    /// Digest of the commit request; unique across series.
    pub idempotency_key: String,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub frequency: SeriesFrequency,
    /// The originating `RecurrencePattern` in its JSON form.
    pub pattern: JsonValue,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub unit_price_cents: i64,
    /// Number of bookings created with the series.
    pub occurrence_count: i32,
    pub created_at: DateTime<Utc>,
}

impl RecurringSeries {
    /// ## Summary
    /// Decodes the stored pattern.
    ///
    /// ## Errors
    /// Returns an error if the JSON no longer matches `RecurrencePattern`.
    pub fn recurrence_pattern(&self) -> DbResult<RecurrencePattern> {
        Ok(serde_json::from_value(self.pattern.clone())?)
    }
}

/// Insert struct for creating a recurring series
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::recurring_series)]
pub struct NewRecurringSeries<'a> {
    pub id: Uuid,
    pub idempotency_key: &'a str,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub frequency: SeriesFrequency,
    pub pattern: JsonValue,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub unit_price_cents: i64,
    pub occurrence_count: i32,
}
