mod app_specific;
pub mod bookings;

use salvo::Router;

// Re-export route constants from core
pub use cadence_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, BOOKINGS_ROUTE_COMPONENT, BOOKINGS_ROUTE_PREFIX,
    RECURRING_ROUTE_COMPONENT, RECURRING_ROUTE_PREFIX, SERIES_ROUTE_COMPONENT, SERIES_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(bookings::routes())
}
