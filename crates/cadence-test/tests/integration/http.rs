//! HTTP round trips through the salvo router.

use std::sync::Arc;

use salvo::http::StatusCode;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};

use cadence_app::app::api::bookings::types::{
    CommitResponse, ErrorResponse, PreviewResponse, SeriesResponse,
};
use cadence_app::app::api::{RECURRING_ROUTE_PREFIX, SERIES_ROUTE_PREFIX};
use cadence_core::types::BookingStatus;
use cadence_test::MemoryStore;
use cadence_test::fixtures::{PROVIDER_ID, http_service, slot, test_settings};

const BASE: &str = "http://127.0.0.1:8698";

fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

fn series_body() -> Value {
    json!({
        "startDate": "2026-03-02",
        "startTime": "14:00:00",
        "pattern": {
            "frequency": "weekly",
            "interval": 1,
            "daysOfWeek": [1, 3, 5],
            "endCondition": {"type": "occurrences", "count": 6}
        },
        "providerId": PROVIDER_ID,
        "customerId": "0190b6a4-0000-7000-8000-000000000002",
        "listingId": "0190b6a4-0000-7000-8000-000000000003",
        "durationMinutes": 60,
        "unitPriceCents": 4500
    })
}

#[test_log::test(tokio::test)]
async fn healthcheck_answers_ok() {
    let store = Arc::new(MemoryStore::new());
    let service = http_service(&store, test_settings());

    let mut res = TestClient::get(url("/api/app/healthcheck"))
        .send(&service)
        .await;

    assert_eq!(res.status_code, Some(StatusCode::OK));
    assert_eq!(res.take_string().await.expect("body"), "OK");
}

#[test_log::test(tokio::test)]
async fn preview_then_commit_then_fetch() {
    let store = Arc::new(MemoryStore::new());
    store.add_booking(PROVIDER_ID, slot(2026, 3, 4, 14, 0), 60, BookingStatus::Confirmed);
    let service = http_service(&store, test_settings());

    let mut res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/preview")))
        .json(&series_body())
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::OK));
    let preview: PreviewResponse = res.take_json().await.expect("preview json");
    assert_eq!(preview.total_occurrences, 6);
    assert_eq!(preview.estimated_cost_cents, 27_000);
    assert_eq!(preview.conflict_count, 1);
    assert!(preview.occurrences[1].has_conflict);
    assert_eq!(
        preview.occurrences[1].conflict_reason.as_deref(),
        Some("Provider already booked 2–3 PM")
    );
    assert_eq!(store.series_count(), 0);

    let mut commit_body = series_body();
    commit_body["conflictPolicy"] = json!("exclude");
    let mut res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/commit")))
        .json(&commit_body)
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::CREATED));
    let committed: CommitResponse = res.take_json().await.expect("commit json");
    assert_eq!(committed.bookings_created, 5);
    assert!(!committed.deduplicated);

    let mut res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/commit")))
        .json(&commit_body)
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::OK));
    let repeated: CommitResponse = res.take_json().await.expect("commit json");
    assert_eq!(repeated.series_id, committed.series_id);
    assert!(repeated.deduplicated);

    let mut res = TestClient::get(url(&format!(
        "{SERIES_ROUTE_PREFIX}/{}",
        committed.series_id
    )))
    .send(&service)
    .await;
    assert_eq!(res.status_code, Some(StatusCode::OK));
    let series: SeriesResponse = res.take_json().await.expect("series json");
    assert_eq!(series.booking_count, 5);
    assert_eq!(series.summary, "Weekly on Mon, Wed, Fri, 6 times");
    assert_eq!(store.series_count(), 1);
}

#[test_log::test(tokio::test)]
async fn invalid_requests_answer_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let service = http_service(&store, test_settings());

    let mut bad_pattern = series_body();
    bad_pattern["pattern"]["daysOfWeek"] = json!([]);
    let mut res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/preview")))
        .json(&bad_pattern)
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    let error: ErrorResponse = res.take_json().await.expect("error json");
    assert!(error.error.contains("day of the week"));

    let res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/preview")))
        .raw_json("{\"startDate\": 12}")
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

    let mut zero_duration = series_body();
    zero_duration["durationMinutes"] = json!(0);
    let res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/commit")))
        .json(&zero_duration)
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    assert_eq!(store.series_count(), 0);
}

#[test_log::test(tokio::test)]
async fn storage_failure_answers_service_unavailable() {
    let store = Arc::new(MemoryStore::new());
    store.fail_insert_at(Some(0));
    let service = http_service(&store, test_settings());

    let mut res = TestClient::post(url(&format!("{RECURRING_ROUTE_PREFIX}/commit")))
        .json(&series_body())
        .send(&service)
        .await;

    assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
    let error: ErrorResponse = res.take_json().await.expect("error json");
    assert!(!error.error.contains("injected"));
    assert_eq!(store.series_count(), 0);
}

#[test_log::test(tokio::test)]
async fn unknown_series_answers_not_found() {
    let store = Arc::new(MemoryStore::new());
    let service = http_service(&store, test_settings());

    let res = TestClient::get(url(&format!(
        "{SERIES_ROUTE_PREFIX}/0190b6a4-0000-7000-8000-0000000000ff"
    )))
    .send(&service)
    .await;
    assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

    let res = TestClient::get(url(&format!("{SERIES_ROUTE_PREFIX}/not-a-uuid")))
        .send(&service)
        .await;
    assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
}
