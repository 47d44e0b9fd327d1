//! HTTP route definitions and handlers.
//!
//! The demo endpoint mutates metrics, the metrics endpoint serves the
//! scrape snapshot, and the health endpoint reports liveness.

mod demo_routes;
mod health_routes;
mod metrics;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(demo_routes::routes())
        .merge(metrics::routes())
        .merge(health_routes::routes())
        .with_state(state)
}
