//! Shared configuration, errors, and dependency-free types for the Cadence
//! recurring booking workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
