use salvo::{Depot, Request, Response, handler, writing::Json};

use cadence_service::booking::{PreviewRequest, build_preview};

use super::render_error;
use super::types::{PreviewResponse, SeriesRequestBody};
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::services_handler::get_checker_from_depot;

/// ## Summary
/// POST /api/bookings/recurring/preview - Expands a pattern and checks it
/// against the provider's bookings
///
/// ## Errors
/// Returns HTTP 400 if the body or pattern is invalid
#[handler]
pub async fn preview(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match handle_preview(req, depot).await {
        Ok(body) => res.render(Json(body)),
        Err(e) => render_error(res, &e),
    }
}

async fn handle_preview(req: &mut Request, depot: &Depot) -> AppResult<PreviewResponse> {
    let body: SeriesRequestBody = req
        .parse_json()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))?;
    let checker = get_checker_from_depot(depot)?;
    let config = get_config_from_depot(depot)?;

    let built = build_preview(&checker, &PreviewRequest::from(body), &config.scheduling).await?;

    Ok(PreviewResponse::from(&built))
}
