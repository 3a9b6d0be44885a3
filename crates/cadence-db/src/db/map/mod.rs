//! Mapping between stored rows and scheduling values.

pub mod booking;
