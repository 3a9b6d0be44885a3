//! Pure calendar arithmetic over immutable `chrono` values.
//!
//! Every helper returns a new value and reports calendar overflow as `None`
//! instead of panicking, so callers can end a sequence at the edge of the
//! representable range.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// ## Summary
/// Returns `date` moved forward by `days` days.
#[must_use]
pub fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

/// ## Summary
/// Returns the number of days in the given month, or `None` for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    next_first.pred_opt().map(|last| last.day())
}

/// ## Summary
/// Moves `date` forward by `months` whole months and lands on `day`, clamped
/// to the last day of the target month.
///
/// The day of `date` itself is ignored, so repeated application from the same
/// anchor never drifts (January 31 + 1 month is February 28/29, + 2 months is
/// March 31).
#[must_use]
pub fn add_months_clamped(date: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let target = date.with_day(1)?.checked_add_months(Months::new(months))?;
    let last = days_in_month(target.year(), target.month())?;
    target.with_day(day.clamp(1, last))
}

/// ## Summary
/// Returns the Sunday that opens the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// ## Summary
/// Maps a weekday index (0 = Sunday .. 6 = Saturday) to a `Weekday`.
#[must_use]
pub const fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// ## Summary
/// Maps a `Weekday` to its index (0 = Sunday .. 6 = Saturday).
#[must_use]
pub fn weekday_index(weekday: Weekday) -> u8 {
    // num_days_from_sunday is always in 0..=6
    u8::try_from(weekday.num_days_from_sunday()).unwrap_or_default()
}
