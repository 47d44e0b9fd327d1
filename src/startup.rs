//! Application startup and server initialization.
//!
//! Builds the metric registry and shared state, then serves the router on
//! the configured address.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::metrics::{DemoMetrics, MetricRegistry, MetricsError};
use crate::routes;
use crate::state::AppState;
use crate::utils::log_throttle::LogThrottle;

/// Interval at which repeated warnings of one kind are let through.
const LOG_THROTTLE_INTERVAL: Duration = Duration::from_secs(10);

/// Creates the application state around a fresh metric registry.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, MetricsError> {
    let metrics = DemoMetrics::new(MetricRegistry::new())?;

    Ok(AppState {
        config,
        metrics,
        log_throttle: Arc::new(LogThrottle::new(LOG_THROTTLE_INTERVAL)),
    })
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the metrics cannot be registered, the server fails
/// to bind to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone())?;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!(
        bind_address = %config.bind_address,
        origin = %config.demo.origin,
        error_rate = config.demo.error_rate,
        "Starting server"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
