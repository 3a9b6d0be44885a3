//! Query composition for `booking`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::BookingStatus;
use crate::db::schema::booking;
use crate::model::booking::{Booking, NewBooking};

/// ## Summary
/// Returns a query for the bookings of `provider_id` that still occupy time,
/// scheduled on a date within `from..=to`.
#[must_use]
pub fn busy_for_provider(
    provider_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> booking::BoxedQuery<'static, diesel::pg::Pg> {
    booking::table
        .filter(booking::provider_id.eq(provider_id))
        .filter(booking::scheduled_date.between(from, to))
        .filter(booking::status.ne(BookingStatus::Cancelled))
        .order((booking::scheduled_date.asc(), booking::start_time.asc()))
        .into_boxed()
}

/// ## Summary
/// Loads the busy bookings of a provider in a date range.
///
/// ## Errors
/// Returns an error if the database query fails.
pub async fn load_busy_for_provider(
    conn: &mut DbConnection<'_>,
    provider_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> QueryResult<Vec<Booking>> {
    busy_for_provider(provider_id, from, to)
        .select(Booking::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts multiple bookings in a batch.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_batch(conn: &mut DbConnection<'_>, bookings: &[NewBooking]) -> QueryResult<usize> {
    if bookings.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(booking::table)
        .values(bookings)
        .execute(conn)
        .await
}
