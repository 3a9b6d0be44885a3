//! Matching slots against a provider's busy intervals.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use super::occurrence::{Occurrence, ScheduledSlot};

/// An existing commitment of the provider, as a half-open local range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BusyInterval {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

/// ## Summary
/// Annotates each slot with whether its `[start, start + duration)` window
/// overlaps any busy interval.
///
/// Output has the same length and order as `slots`. Touching intervals do not
/// conflict. Intervals are sorted once and searched by start, so the cost is
/// `O((n + m) log m)` for `n` slots and `m` intervals.
#[must_use]
pub fn match_conflicts(
    slots: &[ScheduledSlot],
    duration: TimeDelta,
    busy: &[BusyInterval],
) -> Vec<Occurrence> {
    let mut sorted: Vec<&BusyInterval> = busy.iter().filter(|b| b.start < b.end).collect();
    sorted.sort_by_key(|b| b.start);

    // running maximum of `end` over the sorted prefix
    let reach: Vec<NaiveDateTime> = sorted
        .iter()
        .scan(NaiveDateTime::MIN, |max_end, b| {
            *max_end = (*max_end).max(b.end);
            Some(*max_end)
        })
        .collect();

    slots
        .iter()
        .map(|slot| {
            let start = slot.starts_at();
            let end = slot.ends_at(duration).unwrap_or(NaiveDateTime::MAX);
            let before_end = sorted.partition_point(|b| b.start < end);
            if before_end == 0 || reach[before_end - 1] <= start {
                return Occurrence::available(*slot);
            }
            sorted[..before_end]
                .iter()
                .rev()
                .find(|b| b.overlaps(start, end))
                .map_or_else(
                    || Occurrence::available(*slot),
                    |b| Occurrence::conflicting(*slot, conflict_reason(b)),
                )
        })
        .collect()
}

/// ## Summary
/// Human-readable reason for a clash, e.g. "Provider already booked 2–3 PM".
#[must_use]
pub fn conflict_reason(busy: &BusyInterval) -> String {
    format!(
        "Provider already booked {}",
        clock_range(busy.start.time(), busy.end.time())
    )
}

fn clock_range(start: NaiveTime, end: NaiveTime) -> String {
    let (start_label, start_suffix) = clock_label(start);
    let (end_label, end_suffix) = clock_label(end);
    if start_suffix == end_suffix {
        format!("{start_label}–{end_label} {end_suffix}")
    } else {
        format!("{start_label} {start_suffix}–{end_label} {end_suffix}")
    }
}

fn clock_label(time: NaiveTime) -> (String, &'static str) {
    let (pm, hour) = time.hour12();
    let label = if time.minute() == 0 {
        hour.to_string()
    } else {
        format!("{hour}:{:02}", time.minute())
    };
    (label, if pm { "PM" } else { "AM" })
}
