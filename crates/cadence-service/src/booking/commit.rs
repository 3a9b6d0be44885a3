//! Committing a previewed series as durable bookings.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use cadence_core::config::SchedulingConfig;
use cadence_core::types::ConflictPolicy;
use cadence_recur::recur::{Occurrence, RecurrencePattern, ScheduledSlot};

use super::availability::ConflictChecker;
use super::idempotency::idempotency_key;
use super::preview::{PreviewRequest, expand, preview_expansion};
use super::store::{InsertOutcome, NewSeries, SeriesMetadata, SeriesStore, StoredSeries};
use crate::error::{CommitError, ServiceError, ServiceResult, StoreError, StoreResult};

/// Lifecycle of a single commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitState {
    Draft,
    Committing,
    Committed,
    Failed,
}

impl CommitState {
    /// Whether `next` directly follows `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Committing) | (Self::Committing, Self::Committed | Self::Failed)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }
}

struct CommitAttempt<'k> {
    key: &'k str,
    state: CommitState,
}

impl<'k> CommitAttempt<'k> {
    const fn new(key: &'k str) -> Self {
        Self {
            key,
            state: CommitState::Draft,
        }
    }

    fn advance(&mut self, next: CommitState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid commit transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(key = self.key, from = ?self.state, to = ?next, "Commit state changed");
        self.state = next;
    }
}

type InFlightKeys = Arc<Mutex<HashSet<String>>>;

fn lock_keys(keys: &InFlightKeys) -> MutexGuard<'_, HashSet<String>> {
    keys.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds an idempotency key as in flight until dropped.
struct InFlightGuard {
    keys: InFlightKeys,
    key: String,
}

impl InFlightGuard {
    fn acquire(keys: &InFlightKeys, key: &str) -> Option<Self> {
        lock_keys(keys).insert(key.to_owned()).then(|| Self {
            keys: Arc::clone(keys),
            key: key.to_owned(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock_keys(&self.keys).remove(&self.key);
    }
}

/// What a successful commit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub series: StoredSeries,
    /// Bookings written by this call; zero when deduplicated.
    pub bookings_created: usize,
    /// An equivalent request had already been committed.
    pub deduplicated: bool,
}

/// Persists approved previews through a `SeriesStore`.
#[derive(Clone)]
pub struct SeriesCommitter {
    store: Arc<dyn SeriesStore>,
    in_flight: InFlightKeys,
}

impl std::fmt::Debug for SeriesCommitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesCommitter")
            .field("in_flight", &lock_keys(&self.in_flight).len())
            .finish_non_exhaustive()
    }
}

impl SeriesCommitter {
    #[must_use]
    pub fn new(store: Arc<dyn SeriesStore>) -> Self {
        Self {
            store,
            in_flight: Arc::default(),
        }
    }

    /// ## Summary
    /// Commits `occurrences` as one series with a booking per occurrence.
    ///
    /// Every occurrence is written as given; conflict filtering is the
    /// caller's decision. Repeating an equivalent request returns the series
    /// it created the first time.
    ///
    /// ## Errors
    /// - `CommitError::Rejected` for an empty or unordered occurrence list
    /// - `CommitError::InFlight` while an equivalent commit is running
    /// - `CommitError::Storage` if the store fails; nothing is persisted
    pub async fn commit(
        &self,
        pattern: &RecurrencePattern,
        start: ScheduledSlot,
        occurrences: &[Occurrence],
        metadata: &SeriesMetadata,
    ) -> Result<CommitOutcome, CommitError> {
        let slots: Vec<ScheduledSlot> = occurrences.iter().map(|o| o.slot).collect();
        let key = idempotency_key(metadata, pattern, &start, &slots, None)?;
        self.commit_with_key(key, pattern, start, occurrences, metadata)
            .await
    }

    /// ## Summary
    /// Like `commit`, under an idempotency key the caller already derived.
    ///
    /// ## Errors
    /// Same as `commit`.
    #[tracing::instrument(skip_all, fields(
        provider_id = %metadata.provider_id,
        occurrence_count = occurrences.len(),
    ))]
    pub async fn commit_with_key(
        &self,
        key: String,
        pattern: &RecurrencePattern,
        start: ScheduledSlot,
        occurrences: &[Occurrence],
        metadata: &SeriesMetadata,
    ) -> Result<CommitOutcome, CommitError> {
        if occurrences.is_empty() {
            return Err(CommitError::Rejected(
                "there are no occurrences to commit".to_string(),
            ));
        }
        let slots: Vec<ScheduledSlot> = occurrences.iter().map(|o| o.slot).collect();
        if slots.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(CommitError::Rejected(
                "occurrences must be chronological without duplicates".to_string(),
            ));
        }

        let series = NewSeries {
            idempotency_key: key,
            metadata: *metadata,
            pattern: pattern.clone(),
            start,
            slots,
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &series.idempotency_key) else {
            tracing::warn!(key = %series.idempotency_key, "Rejected concurrent commit");
            return Err(CommitError::InFlight);
        };

        let mut attempt = CommitAttempt::new(&series.idempotency_key);
        attempt.advance(CommitState::Committing);

        match self.persist(&series).await {
            Ok(outcome) => {
                attempt.advance(CommitState::Committed);
                tracing::info!(
                    series_id = %outcome.series.id,
                    bookings_created = outcome.bookings_created,
                    deduplicated = outcome.deduplicated,
                    "Series committed"
                );
                Ok(outcome)
            }
            Err(e) => {
                attempt.advance(CommitState::Failed);
                tracing::error!(error = %e, "Series commit failed");
                Err(e.into())
            }
        }
    }

    /// ## Errors
    /// Returns an error if the store lookup fails.
    pub async fn find_committed(&self, key: &str) -> StoreResult<Option<StoredSeries>> {
        self.store.find_by_key(key).await
    }

    async fn persist(&self, series: &NewSeries) -> Result<CommitOutcome, StoreError> {
        if let Some(existing) = self.store.find_by_key(&series.idempotency_key).await? {
            return Ok(CommitOutcome {
                series: existing,
                bookings_created: 0,
                deduplicated: true,
            });
        }

        Ok(match self.store.insert_series(series).await? {
            InsertOutcome::Created(stored) => CommitOutcome {
                bookings_created: stored.booking_count,
                series: stored,
                deduplicated: false,
            },
            InsertOutcome::Existing(stored) => CommitOutcome {
                series: stored,
                bookings_created: 0,
                deduplicated: true,
            },
        })
    }

    /// ## Errors
    /// Returns an error if the store lookup fails.
    pub async fn get_series(&self, id: Uuid) -> StoreResult<Option<StoredSeries>> {
        self.store.get_series(id).await
    }
}

/// A preview request the user approved, with their commit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub preview: PreviewRequest,
    pub conflict_policy: ConflictPolicy,
    /// Overrides the configured policy for occurrences with unknown availability.
    pub allow_unknown_availability: Option<bool>,
}

/// ## Summary
/// Rebuilds the preview for `request`, applies the commit policy, and commits
/// the remaining occurrences.
///
/// The idempotency key covers every expanded slot, before any policy is
/// applied, together with the conflict policy. Repeating a committed request
/// returns the existing series without checking availability again, while the
/// same pattern under a different policy is a different request. With `ConflictPolicy::Exclude`
/// conflicting occurrences are dropped. When unknown availability is not
/// allowed, any unknown occurrence rejects the commit.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` if the request is invalid or the
/// policy rejects it, and `ServiceError::Commit` if committing fails.
#[tracing::instrument(skip_all, fields(
    provider_id = %request.preview.metadata.provider_id,
    conflict_policy = %request.conflict_policy,
))]
pub async fn commit_preview(
    checker: &ConflictChecker,
    committer: &SeriesCommitter,
    request: &CommitRequest,
    config: &SchedulingConfig,
) -> ServiceResult<CommitOutcome> {
    let PreviewRequest {
        start,
        pattern,
        metadata,
        ..
    } = &request.preview;

    let expansion = expand(&request.preview, config)?;
    let key = idempotency_key(
        metadata,
        pattern,
        start,
        &expansion.slots,
        Some(request.conflict_policy),
    )
    .map_err(CommitError::from)?;

    if let Some(existing) = committer.find_committed(&key).await? {
        tracing::debug!(series_id = %existing.id, "Request already committed");
        return Ok(CommitOutcome {
            series: existing,
            bookings_created: 0,
            deduplicated: true,
        });
    }

    let preview = preview_expansion(checker, &request.preview, &expansion).await;

    let allow_unknown = request
        .allow_unknown_availability
        .unwrap_or(config.allow_unknown_availability);
    if !allow_unknown && preview.totals.unknown_count > 0 {
        return Err(ServiceError::ValidationError(format!(
            "availability of {} occurrences could not be checked; re-run the preview",
            preview.totals.unknown_count
        )));
    }

    let selected: Vec<Occurrence> = match request.conflict_policy {
        ConflictPolicy::Include => preview.occurrences,
        ConflictPolicy::Exclude => preview
            .occurrences
            .into_iter()
            .filter(|o| !o.has_conflict())
            .collect(),
    };

    Ok(committer
        .commit_with_key(key, pattern, *start, &selected, metadata)
        .await?)
}
