//! Shared application state.

use crate::config::ConfigV1;
use crate::metrics::DemoMetrics;
use crate::utils::log_throttle::LogThrottle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is a cheap shared handle.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Metrics recorded by handlers and rendered by the scrape endpoint.
    pub metrics: DemoMetrics,
    /// Throttle for repetitive warnings.
    pub log_throttle: Arc<LogThrottle>,
}
