//! Idempotency keys for commit requests.

use serde::Serialize;
use sha2::{Digest, Sha256};

use cadence_core::types::ConflictPolicy;
use cadence_recur::recur::{RecurrencePattern, ScheduledSlot};

use super::store::SeriesMetadata;

/// Bumped whenever the encoding below changes shape.
const KEY_VERSION: u8 = 2;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalRequest<'a> {
    version: u8,
    metadata: &'a SeriesMetadata,
    pattern: &'a RecurrencePattern,
    start: &'a ScheduledSlot,
    slots: &'a [ScheduledSlot],
    conflict_policy: Option<ConflictPolicy>,
}

/// ## Summary
/// Derives the key identifying an equivalent commit request.
///
/// The key is the hex SHA-256 digest of a fixed-order JSON encoding of the
/// metadata, pattern, start, slot list and conflict policy. Two requests
/// share a key exactly when all of these are equal. `conflict_policy` is
/// `None` when the caller chose the occurrences itself.
///
/// ## Errors
/// Returns an error if the request cannot be encoded.
pub fn idempotency_key(
    metadata: &SeriesMetadata,
    pattern: &RecurrencePattern,
    start: &ScheduledSlot,
    slots: &[ScheduledSlot],
    conflict_policy: Option<ConflictPolicy>,
) -> serde_json::Result<String> {
    let canonical = serde_json::to_vec(&CanonicalRequest {
        version: KEY_VERSION,
        metadata,
        pattern,
        start,
        slots,
        conflict_policy,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}
