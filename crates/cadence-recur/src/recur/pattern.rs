//! Recurrence pattern model and validation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::weekday_from_index;
use crate::error::{RecurError, RecurResult};

/// Base unit a pattern repeats on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Whether the pattern selects days through `days_of_week`.
    #[must_use]
    pub const fn uses_weekdays(self) -> bool {
        matches!(self, Self::Weekly | Self::Biweekly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a pattern stops producing occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EndCondition {
    /// Stop after this many occurrences.
    Occurrences { count: u32 },
    /// Stop after the last occurrence on or before this date.
    UntilDate { date: NaiveDate },
    /// No natural end; only the safety cap bounds the sequence.
    Indefinite,
}

/// Immutable description of a repetition rule.
///
/// Only the day selector matching `frequency` is consulted: `days_of_week`
/// for weekly and biweekly patterns, `day_of_month` for monthly ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    pub interval: u32,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday.
    #[serde(default)]
    pub days_of_week: BTreeSet<u8>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub end_condition: EndCondition,
}

impl RecurrencePattern {
    #[must_use]
    pub const fn daily(interval: u32, end_condition: EndCondition) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            days_of_week: BTreeSet::new(),
            day_of_month: None,
            end_condition,
        }
    }

    #[must_use]
    pub fn weekly(
        interval: u32,
        days_of_week: impl IntoIterator<Item = u8>,
        end_condition: EndCondition,
    ) -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval,
            days_of_week: days_of_week.into_iter().collect(),
            day_of_month: None,
            end_condition,
        }
    }

    #[must_use]
    pub fn biweekly(
        interval: u32,
        days_of_week: impl IntoIterator<Item = u8>,
        end_condition: EndCondition,
    ) -> Self {
        Self {
            frequency: Frequency::Biweekly,
            ..Self::weekly(interval, days_of_week, end_condition)
        }
    }

    #[must_use]
    pub const fn monthly(interval: u32, day_of_month: u32, end_condition: EndCondition) -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval,
            days_of_week: BTreeSet::new(),
            day_of_month: Some(day_of_month),
            end_condition,
        }
    }

    /// ## Summary
    /// Checks the pattern is well formed before any expansion happens.
    ///
    /// ## Errors
    /// Returns `RecurError::ValidationError` when the interval is zero, a
    /// weekly pattern has no valid weekdays, a monthly pattern has no day in
    /// 1..=31, or an occurrence count is zero.
    pub fn validate(&self) -> RecurResult<()> {
        if self.interval < 1 {
            return Err(RecurError::ValidationError(
                "interval must be at least 1".to_string(),
            ));
        }

        if self.frequency.uses_weekdays() {
            if self.days_of_week.is_empty() {
                return Err(RecurError::ValidationError(format!(
                    "{} patterns require at least one day of the week",
                    self.frequency
                )));
            }
            if let Some(bad) = self.days_of_week.iter().find(|d| **d > 6) {
                return Err(RecurError::ValidationError(format!(
                    "day of week {bad} is outside 0..=6"
                )));
            }
        }

        if self.frequency == Frequency::Monthly {
            match self.day_of_month {
                Some(day) if (1..=31).contains(&day) => {}
                Some(day) => {
                    return Err(RecurError::ValidationError(format!(
                        "day of month {day} is outside 1..=31"
                    )));
                }
                None => {
                    return Err(RecurError::ValidationError(
                        "monthly patterns require a day of month".to_string(),
                    ));
                }
            }
        }

        if let EndCondition::Occurrences { count: 0 } = self.end_condition {
            return Err(RecurError::ValidationError(
                "occurrence count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of weeks between eligible weeks of a weekly or biweekly pattern.
    #[must_use]
    pub fn week_step(&self) -> u64 {
        match self.frequency {
            Frequency::Biweekly => 2 * u64::from(self.interval),
            _ => u64::from(self.interval),
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency {
            Frequency::Daily if self.interval == 1 => f.write_str("Every day")?,
            Frequency::Daily => write!(f, "Every {} days", self.interval)?,
            Frequency::Weekly | Frequency::Biweekly => {
                let days = self
                    .days_of_week
                    .iter()
                    .filter_map(|d| weekday_from_index(*d))
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                match self.week_step() {
                    1 => write!(f, "Weekly on {days}")?,
                    step => write!(f, "Every {step} weeks on {days}")?,
                }
            }
            Frequency::Monthly => {
                let day = self.day_of_month.unwrap_or_default();
                match self.interval {
                    1 => write!(f, "Monthly on day {day}")?,
                    n => write!(f, "Every {n} months on day {day}")?,
                }
            }
        }

        match self.end_condition {
            EndCondition::Occurrences { count: 1 } => f.write_str(", once"),
            EndCondition::Occurrences { count } => write!(f, ", {count} times"),
            EndCondition::UntilDate { date } => write!(f, ", until {date}"),
            EndCondition::Indefinite => f.write_str(", no end date"),
        }
    }
}
