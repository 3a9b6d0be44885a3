//! Conflict checking against a provider's existing commitments.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use futures::future::BoxFuture;
use uuid::Uuid;

use cadence_recur::recur::calendar::add_days;
use cadence_recur::recur::{BusyInterval, Occurrence, ScheduledSlot, match_conflicts};

use crate::error::StoreResult;

/// Source of a provider's busy time.
pub trait AvailabilitySource: Send + Sync {
    /// ## Summary
    /// Returns every busy interval of `provider_id` that starts on a date in
    /// `from..=to`.
    ///
    /// ## Errors
    /// Returns an error if the lookup fails.
    fn busy_intervals(
        &self,
        provider_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BoxFuture<'_, StoreResult<Vec<BusyInterval>>>;
}

/// Annotates generated slots with conflict information.
#[derive(Clone)]
pub struct ConflictChecker {
    source: Arc<dyn AvailabilitySource>,
}

impl ConflictChecker {
    #[must_use]
    pub fn new(source: Arc<dyn AvailabilitySource>) -> Self {
        Self { source }
    }

    /// ## Summary
    /// Annotates each slot, in order, against the busy time of `provider_id`.
    ///
    /// One lookup covers the whole span, padded by a day on both sides so
    /// bookings crossing midnight are seen. If the lookup fails every slot is
    /// marked unknown instead of failing the preview.
    #[tracing::instrument(skip(self, slots), fields(
        provider_id = %provider_id,
        slot_count = slots.len(),
    ))]
    pub async fn annotate(
        &self,
        slots: &[ScheduledSlot],
        provider_id: Uuid,
        duration: TimeDelta,
    ) -> Vec<Occurrence> {
        let (Some(first), Some(last)) = (slots.iter().min(), slots.iter().max()) else {
            return Vec::new();
        };
        let from = first.date.pred_opt().unwrap_or(first.date);
        let to = add_days(last.date, 1).unwrap_or(last.date);

        match self.source.busy_intervals(provider_id, from, to).await {
            Ok(busy) => {
                let annotated = match_conflicts(slots, duration, &busy);
                tracing::debug!(
                    busy_count = busy.len(),
                    conflict_count = annotated.iter().filter(|o| o.has_conflict()).count(),
                    "Checked slots against busy intervals"
                );
                annotated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Availability lookup failed; marking slots unknown");
                slots.iter().copied().map(Occurrence::unknown).collect()
            }
        }
    }
}

impl std::fmt::Debug for ConflictChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictChecker").finish_non_exhaustive()
    }
}
