//! Postgres persistence for recurring series and their bookings.

pub mod db;
pub mod error;
pub mod model;
