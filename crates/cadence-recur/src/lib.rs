//! Recurrence rules for bookings: pattern model, calendar arithmetic,
//! occurrence expansion, conflict matching, and preview totals.
//!
//! Everything in this crate is synchronous and free of I/O.

pub mod error;
pub mod recur;
