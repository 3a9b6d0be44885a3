use salvo::async_trait;

use crate::error::AppResult;
use cadence_core::error::CoreError;
use cadence_service::booking::{ConflictChecker, SeriesCommitter};

/// Injects the booking services into every request's depot.
#[derive(Clone, Debug)]
pub struct BookingServicesHandler {
    pub checker: ConflictChecker,
    pub committer: SeriesCommitter,
}

#[async_trait]
impl salvo::Handler for BookingServicesHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        // Both services are cheap handles over shared state
        depot.inject(self.checker.clone());
        depot.inject(self.committer.clone());
    }
}

/// ## Summary
/// Retrieves the conflict checker from the depot.
///
/// ## Errors
/// Returns an error if the checker is not found in the depot.
pub fn get_checker_from_depot(depot: &salvo::Depot) -> AppResult<ConflictChecker> {
    depot
        .obtain::<ConflictChecker>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Conflict checker not found in depot").into())
}

/// ## Summary
/// Retrieves the series committer from the depot.
///
/// ## Errors
/// Returns an error if the committer is not found in the depot.
pub fn get_committer_from_depot(depot: &salvo::Depot) -> AppResult<SeriesCommitter> {
    depot
        .obtain::<SeriesCommitter>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Series committer not found in depot").into())
}
