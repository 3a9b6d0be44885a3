//! Shared fixtures for integration tests.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use salvo::{Router, Service};
use uuid::Uuid;

use cadence_app::app::api::routes;
use cadence_app::config::{
    ConfigHandler, DatabaseConfig, LoggingConfig, SchedulingConfig, ServerConfig, Settings,
};
use cadence_app::services_handler::BookingServicesHandler;
use cadence_recur::recur::{RecurrencePattern, ScheduledSlot};
use cadence_service::booking::{ConflictChecker, PreviewRequest, SeriesCommitter, SeriesMetadata};

use crate::memory::MemoryStore;

pub const PROVIDER_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001);
pub const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0002);
pub const LISTING_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0003);

/// ## Summary
/// Builds a slot, panicking on an invalid date or time.
#[must_use]
pub fn slot(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> ScheduledSlot {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"));
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| panic!("invalid time {hour}:{minute}"));
    ScheduledSlot::new(date, time)
}

/// Monday 2026-03-02 at 14:00.
#[must_use]
pub fn monday_afternoon() -> ScheduledSlot {
    slot(2026, 3, 2, 14, 0)
}

/// One hour with the fixture provider at `unit_price_cents`.
#[must_use]
pub const fn metadata(unit_price_cents: i64) -> SeriesMetadata {
    SeriesMetadata {
        provider_id: PROVIDER_ID,
        customer_id: CUSTOMER_ID,
        listing_id: LISTING_ID,
        duration_minutes: 60,
        unit_price_cents,
    }
}

#[must_use]
pub fn preview_request(
    start: ScheduledSlot,
    pattern: RecurrencePattern,
    unit_price_cents: i64,
) -> PreviewRequest {
    PreviewRequest {
        start,
        pattern,
        metadata: metadata(unit_price_cents),
        safety_cap: None,
    }
}

/// ## Summary
/// Wires both booking services over the same in-memory store.
#[must_use]
pub fn services(store: &Arc<MemoryStore>) -> (ConflictChecker, SeriesCommitter) {
    (
        ConflictChecker::new(store.clone()),
        SeriesCommitter::new(store.clone()),
    )
}

#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8698,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        scheduling: SchedulingConfig::default(),
    }
}

/// ## Summary
/// Builds the HTTP service the binary serves, backed by `store`.
#[must_use]
pub fn http_service(store: &Arc<MemoryStore>, settings: Settings) -> Service {
    let (checker, committer) = services(store);
    let router = Router::new()
        .hoop(ConfigHandler { settings })
        .hoop(BookingServicesHandler { checker, committer })
        .push(routes());
    Service::new(router)
}
