//! Preview orchestration: validate, expand, check, price.

use cadence_core::config::SchedulingConfig;
use cadence_recur::recur::{Expansion, Preview, RecurrencePattern, ScheduledSlot, generate};

use super::availability::ConflictChecker;
use super::store::SeriesMetadata;
use crate::error::{ServiceError, ServiceResult};

/// Longest bookable occurrence, one full day.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Everything needed to preview, and later commit, a recurring booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub start: ScheduledSlot,
    pub pattern: RecurrencePattern,
    pub metadata: SeriesMetadata,
    /// Lowers the configured safety cap for this request only.
    pub safety_cap: Option<usize>,
}

impl PreviewRequest {
    /// ## Summary
    /// Checks the request and returns the safety cap to expand with.
    ///
    /// ## Errors
    /// Returns `ServiceError::ValidationError` for a duration outside
    /// `1..=1440` minutes, a negative price, a zero cap, a malformed pattern,
    /// or a price whose total over the cap does not fit in an `i64`.
    pub fn validate(&self, config: &SchedulingConfig) -> ServiceResult<usize> {
        if !(1..=MAX_DURATION_MINUTES).contains(&self.metadata.duration_minutes) {
            return Err(ServiceError::ValidationError(format!(
                "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
            )));
        }
        if self.metadata.unit_price_cents < 0 {
            return Err(ServiceError::ValidationError(
                "unit price must not be negative".to_string(),
            ));
        }
        if self.safety_cap == Some(0) {
            return Err(ServiceError::ValidationError(
                "safety cap must be at least 1".to_string(),
            ));
        }
        self.pattern.validate()?;

        let safety_cap = self
            .safety_cap
            .map_or(config.safety_cap, |cap| cap.min(config.safety_cap));
        // the estimate for a full expansion must stay exact
        if i64::try_from(safety_cap)
            .ok()
            .and_then(|cap| cap.checked_mul(self.metadata.unit_price_cents))
            .is_none()
        {
            return Err(ServiceError::ValidationError(format!(
                "unit price is too large to estimate {safety_cap} occurrences"
            )));
        }

        Ok(safety_cap)
    }
}

/// ## Summary
/// Validates `request` and expands its pattern into slots.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` if the request is invalid.
pub fn expand(request: &PreviewRequest, config: &SchedulingConfig) -> ServiceResult<Expansion> {
    let safety_cap = request.validate(config)?;
    Ok(generate(request.start, &request.pattern, safety_cap)?)
}

/// ## Summary
/// Checks already expanded slots against the provider's busy time and totals
/// the cost.
pub async fn preview_expansion(
    checker: &ConflictChecker,
    request: &PreviewRequest,
    expansion: &Expansion,
) -> Preview {
    let occurrences = checker
        .annotate(
            &expansion.slots,
            request.metadata.provider_id,
            request.metadata.duration(),
        )
        .await;

    let preview = Preview::new(
        &request.pattern,
        expansion,
        occurrences,
        request.metadata.unit_price_cents,
    );

    tracing::debug!(
        total = preview.totals.total_occurrences,
        conflicts = preview.totals.conflict_count,
        unknown = preview.totals.unknown_count,
        truncated = preview.truncated,
        "Preview built"
    );

    preview
}

/// ## Summary
/// Builds the preview for `request`: expands the pattern, checks every slot
/// against the provider's busy time and totals the cost.
///
/// An availability failure does not fail the preview; the affected slots are
/// reported as unknown.
///
/// ## Errors
/// Returns `ServiceError::ValidationError` if the request is invalid.
#[tracing::instrument(skip(checker, request, config), fields(
    provider_id = %request.metadata.provider_id,
    pattern = %request.pattern,
))]
pub async fn build_preview(
    checker: &ConflictChecker,
    request: &PreviewRequest,
    config: &SchedulingConfig,
) -> ServiceResult<Preview> {
    let expansion = expand(request, config)?;
    Ok(preview_expansion(checker, request, &expansion).await)
}
