mod health;
mod submissions;

use std::sync::Arc;

use axum::Router;

use crate::service::SubmissionService;

/// Build the submission module router.
///
/// Routes:
/// - `POST   /submissions`       create submission
/// - `GET    /submissions`       list submissions (`?page&limit`)
/// - `GET    /submissions/{id}`  get submission
/// - `DELETE /submissions/{id}`  delete submission
/// - `GET    /health`            liveness
pub fn router(service: Arc<SubmissionService>) -> Router {
    Router::new()
        .merge(submissions::router(service))
        .merge(health::router())
}
