//! Errors reported by the metric registry.

use thiserror::Error;

/// Failures returned synchronously by registry operations.
///
/// None of these are fatal; the caller decides how to surface them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// The name is already registered with an incompatible kind or label schema.
    #[error("metric '{name}' is already registered: {reason}")]
    DuplicateMetric { name: String, reason: String },

    /// The supplied labels do not match the declared label keys.
    #[error("invalid labels for metric '{name}': {reason}")]
    InvalidLabel { name: String, reason: String },

    /// A counter was asked to go backwards.
    #[error("counter '{name}' cannot be decreased (delta {delta})")]
    NegativeDelta { name: String, delta: f64 },

    /// A metric name or label key is not a valid exposition identifier.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}
