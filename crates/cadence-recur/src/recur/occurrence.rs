//! Scheduled slots and their availability annotations.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// One concrete local wall-clock start produced by expanding a pattern.
///
/// Field order gives the derived `Ord` its (date, time) chronology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl ScheduledSlot {
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date, self.time)
    }

    /// End of the slot's window, or `None` past the representable range.
    #[must_use]
    pub fn ends_at(&self, duration: TimeDelta) -> Option<NaiveDateTime> {
        self.starts_at().checked_add_signed(duration)
    }
}

/// Outcome of checking a slot against the provider's commitments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Conflict { reason: String },
    /// The commitments lookup failed; the slot may or may not be free.
    Unknown,
}

/// A slot annotated by the conflict checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub slot: ScheduledSlot,
    pub availability: Availability,
}

impl Occurrence {
    #[must_use]
    pub const fn available(slot: ScheduledSlot) -> Self {
        Self {
            slot,
            availability: Availability::Available,
        }
    }

    #[must_use]
    pub fn conflicting(slot: ScheduledSlot, reason: impl Into<String>) -> Self {
        Self {
            slot,
            availability: Availability::Conflict {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub const fn unknown(slot: ScheduledSlot) -> Self {
        Self {
            slot,
            availability: Availability::Unknown,
        }
    }

    #[must_use]
    pub const fn has_conflict(&self) -> bool {
        matches!(self.availability, Availability::Conflict { .. })
    }

    /// Present exactly when `has_conflict` is true.
    #[must_use]
    pub fn conflict_reason(&self) -> Option<&str> {
        match &self.availability {
            Availability::Conflict { reason } => Some(reason.as_str()),
            Availability::Available | Availability::Unknown => None,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self.availability, Availability::Unknown)
    }
}
