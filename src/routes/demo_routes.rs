//! The instrumented demo endpoint.

use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use rand::Rng;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::metrics::MetricsRecorder;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers the demo route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(demo_handler))
}

/// Simulates a unit of work with random latency and a configured failure rate.
///
/// Every call bumps `request_count` and sets `response_latency`; failed
/// calls also bump `error_count` and answer with a 500.
async fn demo_handler(State(state): State<AppState>) -> Result<impl IntoResponse, HTTPError> {
    let request_id = Uuid::new_v4();
    let origin = state.config.demo.origin.clone();
    let span = info_span!("demo_request", %request_id, origin = %origin);

    async move {
        let demo = &state.config.demo;
        let started = Instant::now();

        let (delay_ms, fail) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0..=demo.max_latency_ms),
                rng.gen_bool(demo.error_rate),
            )
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        state.metrics.record_request(&origin);
        state.metrics.record_latency(&origin, latency_ms);

        if fail {
            state.metrics.record_error(&origin);
            if let Some(suppressed) = state.log_throttle.should_emit("demo.simulated_failure") {
                warn!(latency_ms, suppressed, "Simulated failure");
            }
            return Err(HTTPError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Simulated failure",
            ));
        }

        debug!(latency_ms, "Request served");
        Ok((StatusCode::OK, "Hello from the instrumented demo"))
    }
    .instrument(span)
    .await
}
