//! Expansion of a recurrence pattern into an ordered, bounded slot sequence.
//!
//! Candidate dates are produced lazily per frequency, then bounded by the end
//! condition and finally by the safety cap. Peeking one element past the cap
//! tells whether the cap, rather than the end condition, stopped expansion.

use chrono::NaiveDate;

use super::calendar::{add_days, add_months_clamped, week_start};
use super::occurrence::ScheduledSlot;
use super::pattern::{EndCondition, Frequency, RecurrencePattern};
use crate::error::{RecurError, RecurResult};

/// Ordered slots produced from one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Strictly chronological, without duplicate (date, time) pairs.
    pub slots: Vec<ScheduledSlot>,
    /// The safety cap ended expansion while the end condition still allowed more.
    pub truncated: bool,
}

/// ## Summary
/// Expands `pattern` from `start` into at most `safety_cap` slots.
///
/// Every slot keeps the start time. Producing no slots (for example an
/// `untilDate` before `start`) is a valid result.
///
/// ## Errors
/// Returns `RecurError::ValidationError` if the pattern is malformed or the
/// safety cap is zero.
#[tracing::instrument(skip(pattern), fields(
    frequency = %pattern.frequency,
    interval = pattern.interval,
))]
pub fn generate(
    start: ScheduledSlot,
    pattern: &RecurrencePattern,
    safety_cap: usize,
) -> RecurResult<Expansion> {
    pattern.validate()?;
    if safety_cap == 0 {
        return Err(RecurError::ValidationError(
            "safety cap must be at least 1".to_string(),
        ));
    }

    let (count, until) = match pattern.end_condition {
        EndCondition::Occurrences { count } => {
            (usize::try_from(count).unwrap_or(usize::MAX), None)
        }
        EndCondition::UntilDate { date } => (usize::MAX, Some(date)),
        EndCondition::Indefinite => (usize::MAX, None),
    };

    let mut bounded = candidate_dates(start.date, pattern)
        .take_while(move |date| until.is_none_or(|last| *date <= last))
        .take(count);

    let slots: Vec<ScheduledSlot> = bounded
        .by_ref()
        .take(safety_cap)
        .map(|date| ScheduledSlot::new(date, start.time))
        .collect();
    let truncated = slots.len() == safety_cap && bounded.next().is_some();

    tracing::debug!(count = slots.len(), truncated, "Expanded recurrence pattern");

    Ok(Expansion { slots, truncated })
}

/// Unbounded, ascending candidate dates on or after `start`.
///
/// Sequences end early only when the calendar range is exhausted.
fn candidate_dates(
    start: NaiveDate,
    pattern: &RecurrencePattern,
) -> Box<dyn Iterator<Item = NaiveDate>> {
    match pattern.frequency {
        Frequency::Daily => {
            let step = u64::from(pattern.interval);
            Box::new(
                (0u64..)
                    .map_while(move |k| k.checked_mul(step).and_then(|days| add_days(start, days))),
            )
        }
        Frequency::Weekly | Frequency::Biweekly => {
            let Some(anchor) = week_start(start) else {
                return Box::new(std::iter::empty());
            };
            let step = pattern.week_step().saturating_mul(7);
            let offsets: Vec<u64> = pattern.days_of_week.iter().map(|d| u64::from(*d)).collect();
            Box::new(
                (0u64..)
                    .map_while(move |k| {
                        k.checked_mul(step).and_then(|days| add_days(anchor, days))
                    })
                    .flat_map(move |week| {
                        offsets
                            .clone()
                            .into_iter()
                            .filter_map(move |offset| add_days(week, offset))
                    })
                    .filter(move |date| *date >= start),
            )
        }
        Frequency::Monthly => {
            let step = pattern.interval;
            let day = pattern.day_of_month.unwrap_or(1);
            Box::new(
                (0u32..)
                    .map_while(move |k| {
                        k.checked_mul(step)
                            .and_then(|months| add_months_clamped(start, months, day))
                    })
                    .filter(move |date| *date >= start),
            )
        }
    }
}
