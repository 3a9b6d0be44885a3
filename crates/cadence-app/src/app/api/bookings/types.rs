//! JSON bodies of the booking endpoints.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadence_core::types::ConflictPolicy;
use cadence_recur::recur::{Availability, Occurrence, Preview, RecurrencePattern, ScheduledSlot};
use cadence_service::booking::{
    CommitOutcome, CommitRequest, PreviewRequest, SeriesMetadata, StoredSeries,
};

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a preview request; also the base of a commit request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequestBody {
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub pattern: RecurrencePattern,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub duration_minutes: u32,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub safety_cap: Option<usize>,
}

impl From<SeriesRequestBody> for PreviewRequest {
    fn from(body: SeriesRequestBody) -> Self {
        Self {
            start: ScheduledSlot::new(body.start_date, body.start_time),
            pattern: body.pattern,
            metadata: SeriesMetadata {
                provider_id: body.provider_id,
                customer_id: body.customer_id,
                listing_id: body.listing_id,
                duration_minutes: body.duration_minutes,
                unit_price_cents: body.unit_price_cents,
            },
            safety_cap: body.safety_cap,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequestBody {
    #[serde(flatten)]
    pub series: SeriesRequestBody,
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
    #[serde(default)]
    pub allow_unknown_availability: Option<bool>,
}

impl From<CommitRequestBody> for CommitRequest {
    fn from(body: CommitRequestBody) -> Self {
        Self {
            preview: body.series.into(),
            conflict_policy: body.conflict_policy,
            allow_unknown_availability: body.allow_unknown_availability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityView {
    Available,
    Conflict,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceView {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub has_conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub conflict_reason: Option<String>,
    pub availability: AvailabilityView,
}

impl From<&Occurrence> for OccurrenceView {
    fn from(occurrence: &Occurrence) -> Self {
        let availability = match occurrence.availability {
            Availability::Available => AvailabilityView::Available,
            Availability::Conflict { .. } => AvailabilityView::Conflict,
            Availability::Unknown => AvailabilityView::Unknown,
        };
        Self {
            date: occurrence.slot.date,
            time: occurrence.slot.time,
            has_conflict: occurrence.has_conflict(),
            conflict_reason: occurrence.conflict_reason().map(str::to_owned),
            availability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub occurrences: Vec<OccurrenceView>,
    pub total_occurrences: usize,
    pub estimated_cost_cents: i64,
    pub conflict_count: usize,
    pub unknown_count: usize,
    pub truncated: bool,
    pub summary: String,
}

impl From<&Preview> for PreviewResponse {
    fn from(preview: &Preview) -> Self {
        Self {
            occurrences: preview.occurrences.iter().map(OccurrenceView::from).collect(),
            total_occurrences: preview.totals.total_occurrences,
            estimated_cost_cents: preview.totals.estimated_cost_cents,
            conflict_count: preview.totals.conflict_count,
            unknown_count: preview.totals.unknown_count,
            truncated: preview.truncated,
            summary: preview.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub series_id: Uuid,
    pub bookings_created: usize,
    pub deduplicated: bool,
}

impl From<&CommitOutcome> for CommitResponse {
    fn from(outcome: &CommitOutcome) -> Self {
        Self {
            series_id: outcome.series.id,
            bookings_created: outcome.bookings_created,
            deduplicated: outcome.deduplicated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Uuid,
    pub listing_id: Uuid,
    pub pattern: RecurrencePattern,
    pub summary: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub unit_price_cents: i64,
    pub booking_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredSeries> for SeriesResponse {
    fn from(series: &StoredSeries) -> Self {
        Self {
            id: series.id,
            provider_id: series.metadata.provider_id,
            customer_id: series.metadata.customer_id,
            listing_id: series.metadata.listing_id,
            summary: series.pattern.to_string(),
            pattern: series.pattern.clone(),
            start_date: series.start.date,
            start_time: series.start.time,
            duration_minutes: series.metadata.duration_minutes,
            unit_price_cents: series.metadata.unit_price_cents,
            booking_count: series.booking_count,
            created_at: series.created_at,
        }
    }
}
