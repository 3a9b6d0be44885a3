//! Recurring booking endpoints.

mod commit;
mod preview;
mod series;
pub mod types;

use salvo::{Response, Router, writing::Json};

use cadence_core::constants::{
    BOOKINGS_ROUTE_COMPONENT, RECURRING_ROUTE_COMPONENT, SERIES_ROUTE_COMPONENT,
};

use crate::error::AppError;
use types::ErrorResponse;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(BOOKINGS_ROUTE_COMPONENT)
        .push(
            Router::with_path(RECURRING_ROUTE_COMPONENT)
                .push(Router::with_path("preview").post(preview::preview))
                .push(Router::with_path("commit").post(commit::commit)),
        )
        .push(Router::with_path(SERIES_ROUTE_COMPONENT).push(Router::with_path("{id}").get(series::get_series)))
}

fn render_error(res: &mut Response, err: &AppError) {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, status = %status, "Booking request failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Booking request rejected");
    }
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error: err.public_message(),
    }));
}
