use salvo::{Depot, Request, Response, handler, http::StatusCode, writing::Json};

use cadence_service::booking::{CommitRequest, commit_preview};

use super::render_error;
use super::types::{CommitRequestBody, CommitResponse};
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult};
use crate::services_handler::{get_checker_from_depot, get_committer_from_depot};

/// ## Summary
/// POST /api/bookings/recurring/commit - Commits a previewed series
///
/// Answers 201 when bookings were created and 200 when an equivalent request
/// had already been committed.
///
/// ## Errors
/// Returns HTTP 400 if the request is invalid or rejected by policy
/// Returns HTTP 409 if an equivalent commit is in flight
/// Returns HTTP 503 if storage fails; nothing is persisted
#[handler]
pub async fn commit(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match handle_commit(req, depot).await {
        Ok(body) => {
            res.status_code(if body.deduplicated {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            });
            res.render(Json(body));
        }
        Err(e) => render_error(res, &e),
    }
}

async fn handle_commit(req: &mut Request, depot: &Depot) -> AppResult<CommitResponse> {
    let body: CommitRequestBody = req
        .parse_json()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))?;
    let checker = get_checker_from_depot(depot)?;
    let committer = get_committer_from_depot(depot)?;
    let config = get_config_from_depot(depot)?;

    let outcome = commit_preview(
        &checker,
        &committer,
        &CommitRequest::from(body),
        &config.scheduling,
    )
    .await?;

    Ok(CommitResponse::from(&outcome))
}
