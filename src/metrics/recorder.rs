//! Service-level metrics recorded by the demo endpoint.

use tracing::warn;

use super::error::MetricsError;
use super::registry::{Counter, Gauge, MetricRegistry};

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records a request served for `origin`, whatever its outcome.
    fn record_request(&self, origin: &str);

    /// Records a failed request.
    fn record_error(&self, origin: &str);

    /// Records the latency of the most recent response in milliseconds.
    fn record_latency(&self, origin: &str, millis: f64);
}

/// Metrics exported by the demo service.
#[derive(Clone)]
pub struct DemoMetrics {
    registry: MetricRegistry,

    request_count: Counter,
    error_count: Counter,
    response_latency: Gauge,
}

impl DemoMetrics {
    /// Registers the demo metrics in `registry`.
    ///
    /// Calling this twice on the same registry hands back the same series.
    pub fn new(registry: MetricRegistry) -> Result<Self, MetricsError> {
        let request_count = registry.create_counter(
            "request_count",
            "Total number of requests served",
            &["origin"],
        )?;
        let error_count = registry.create_counter(
            "error_count",
            "Total number of requests that failed",
            &["origin"],
        )?;
        let response_latency = registry.create_gauge(
            "response_latency",
            "Latency of the most recent response in milliseconds",
            &["origin"],
        )?;

        Ok(DemoMetrics {
            registry,
            request_count,
            error_count,
            response_latency,
        })
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.registry.render_snapshot()
    }
}

fn log_failure(metric: &str, result: Result<(), MetricsError>) {
    if let Err(e) = result {
        warn!(metric, error = %e, "Failed to record metric");
    }
}

impl MetricsRecorder for DemoMetrics {
    fn record_request(&self, origin: &str) {
        log_failure(
            self.request_count.name(),
            self.request_count.inc(&[("origin", origin)]),
        );
    }

    fn record_error(&self, origin: &str) {
        log_failure(
            self.error_count.name(),
            self.error_count.inc(&[("origin", origin)]),
        );
    }

    fn record_latency(&self, origin: &str, millis: f64) {
        log_failure(
            self.response_latency.name(),
            self.response_latency.set(&[("origin", origin)], millis),
        );
    }
}
