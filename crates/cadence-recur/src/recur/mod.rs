//! Recurring booking rules and their expansion into concrete occurrences.

pub mod calendar;
pub mod generate;
pub mod matcher;
pub mod occurrence;
pub mod pattern;
pub mod preview;

pub use generate::{Expansion, generate};
pub use matcher::{BusyInterval, match_conflicts};
pub use occurrence::{Availability, Occurrence, ScheduledSlot};
pub use pattern::{EndCondition, Frequency, RecurrencePattern};
pub use preview::{Preview, PreviewTotals, aggregate};
