use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::{pg::Pg, prelude::*};
use uuid::Uuid;

use crate::db::{enums::BookingStatus, schema};

/// A single scheduled appointment, optionally owned by a recurring series
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::booking)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::series::RecurringSeries, foreign_key = series_id))]
pub struct Booking {
    pub id: Uuid,
    pub series_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub status: BookingStatus,
    pub occurrence_index: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Insert struct for creating bookings
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::booking)]
pub struct NewBooking {
    pub id: Uuid,
    pub series_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub status: BookingStatus,
    pub occurrence_index: Option<i32>,
}
