use salvo::{Depot, Request, Response, handler, writing::Json};
use uuid::Uuid;

use cadence_service::error::ServiceError;

use super::render_error;
use super::types::SeriesResponse;
use crate::error::AppResult;
use crate::services_handler::get_committer_from_depot;

/// ## Summary
/// GET /api/bookings/series/{id} - Returns a committed series
///
/// ## Errors
/// Returns HTTP 404 if no series has the id
#[handler]
pub async fn get_series(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match handle_get_series(req, depot).await {
        Ok(body) => res.render(Json(body)),
        Err(e) => render_error(res, &e),
    }
}

async fn handle_get_series(req: &Request, depot: &Depot) -> AppResult<SeriesResponse> {
    let raw_id = req.param::<String>("id").unwrap_or_default();
    let Ok(id) = Uuid::parse_str(&raw_id) else {
        return Err(ServiceError::NotFound(format!("series {raw_id}")).into());
    };
    let committer = get_committer_from_depot(depot)?;

    let series = committer
        .get_series(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("series {id}")))?;

    Ok(SeriesResponse::from(&series))
}
