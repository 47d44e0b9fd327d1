//! Metrics collection and exposition.
//!
//! The registry is an explicit value created at startup and shared through
//! the application state; the recorder maps service events onto it.

mod error;
mod recorder;
mod registry;

pub use error::MetricsError;
pub use recorder::{DemoMetrics, MetricsRecorder};
pub use registry::{Counter, Gauge, MetricKind, MetricRegistry};
