use chrono::TimeDelta;
use uuid::Uuid;

use cadence_core::error::CoreError;
use cadence_recur::recur::{BusyInterval, ScheduledSlot};

use crate::db::enums::BookingStatus;
use crate::error::DbResult;
use crate::model::booking::{Booking, NewBooking};

/// Fields shared by every booking created for one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTemplate {
    pub series_id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub status: BookingStatus,
}

/// ## Summary
/// Builds one booking row per slot, numbered from zero in slot order.
///
/// ## Errors
/// Returns an error if there are more slots than an `i32` index can number.
pub fn booking_rows(template: &BookingTemplate, slots: &[ScheduledSlot]) -> DbResult<Vec<NewBooking>> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let occurrence_index = i32::try_from(index)
                .map_err(|_| CoreError::InvariantViolation("occurrence index exceeds i32"))?;
            Ok(NewBooking {
                id: Uuid::now_v7(),
                series_id: Some(template.series_id),
                provider_id: template.provider_id,
                customer_id: template.customer_id,
                listing_id: template.listing_id,
                scheduled_date: slot.date,
                start_time: slot.time,
                duration_minutes: template.duration_minutes,
                price_cents: template.price_cents,
                status: template.status,
                occurrence_index: Some(occurrence_index),
            })
        })
        .collect()
}

/// ## Summary
/// The time a stored booking occupies, or `None` when it frees none.
///
/// Cancelled bookings and rows with a non-positive duration are skipped.
#[must_use]
pub fn busy_interval(booking: &Booking) -> Option<BusyInterval> {
    if !cadence_core::types::BookingStatus::from(booking.status).is_busy()
        || booking.duration_minutes <= 0
    {
        return None;
    }
    let slot = ScheduledSlot::new(booking.scheduled_date, booking.start_time);
    let end = slot.ends_at(TimeDelta::minutes(i64::from(booking.duration_minutes)))?;
    Some(BusyInterval::new(slot.starts_at(), end))
}
