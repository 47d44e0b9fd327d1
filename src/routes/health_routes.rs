//! Health check endpoints.

use crate::state::AppState;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe for the orchestrator.
///
/// Answers 200 with a plain `OK` body whenever the server is accepting requests.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
