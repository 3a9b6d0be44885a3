//! Cadence recurring bookings - integration test support.
//!
//! Provides an in-memory store implementing both service seams, with fault
//! injection, plus fixtures, an HTTP service wired like the binary, and a
//! migrated Postgres pool for tests that exercise the real store.

pub mod fixtures;
pub mod memory;
pub mod postgres;

pub use memory::{MemoryBooking, MemoryStore};
