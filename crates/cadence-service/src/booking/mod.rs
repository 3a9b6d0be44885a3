//! Recurring booking preview and commit.

pub mod availability;
pub mod commit;
pub mod idempotency;
pub mod postgres;
pub mod preview;
pub mod store;

pub use availability::{AvailabilitySource, ConflictChecker};
pub use commit::{CommitOutcome, CommitRequest, CommitState, SeriesCommitter, commit_preview};
pub use preview::{PreviewRequest, build_preview, expand, preview_expansion};
pub use store::{InsertOutcome, NewSeries, SeriesMetadata, SeriesStore, StoredSeries};
