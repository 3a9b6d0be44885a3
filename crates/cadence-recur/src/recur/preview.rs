//! Preview totals over annotated occurrences.

use serde::Serialize;

use super::generate::Expansion;
use super::occurrence::Occurrence;
use super::pattern::RecurrencePattern;

/// Aggregate figures shown alongside a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTotals {
    pub total_occurrences: usize,
    /// Unit price times occurrence count, in minor currency units.
    pub estimated_cost_cents: i64,
    pub conflict_count: usize,
    pub unknown_count: usize,
}

/// ## Summary
/// Computes totals over `occurrences` with flat per-occurrence pricing.
///
/// Conflicting and unknown occurrences are priced like any other; they are
/// surfaced for the user to decide on, not excluded.
#[must_use]
pub fn aggregate(occurrences: &[Occurrence], unit_price_cents: i64) -> PreviewTotals {
    let total_occurrences = occurrences.len();
    let estimated_cost_cents = i64::try_from(total_occurrences)
        .map_or(i64::MAX, |count| count.saturating_mul(unit_price_cents));

    PreviewTotals {
        total_occurrences,
        estimated_cost_cents,
        conflict_count: occurrences.iter().filter(|o| o.has_conflict()).count(),
        unknown_count: occurrences.iter().filter(|o| o.is_unknown()).count(),
    }
}

/// Ephemeral result of expanding, checking, and pricing a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub occurrences: Vec<Occurrence>,
    #[serde(flatten)]
    pub totals: PreviewTotals,
    /// The safety cap cut the sequence short; the list is not complete.
    pub truncated: bool,
    pub summary: String,
}

impl Preview {
    #[must_use]
    pub fn new(
        pattern: &RecurrencePattern,
        expansion: &Expansion,
        occurrences: Vec<Occurrence>,
        unit_price_cents: i64,
    ) -> Self {
        let totals = aggregate(&occurrences, unit_price_cents);
        Self {
            occurrences,
            totals,
            truncated: expansion.truncated,
            summary: pattern.to_string(),
        }
    }
}
