use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Behaviour of the instrumented demo endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct DemoConfig {
    /// Value of the `origin` label attached to every recorded series.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Probability in [0, 1] that a request fails with a 500.
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,
    /// Upper bound of the simulated processing delay.
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            origin: default_origin(),
            error_rate: default_error_rate(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}

fn default_origin() -> String {
    "demo".to_string()
}

fn default_error_rate() -> f64 {
    0.1
}

fn default_max_latency_ms() -> u64 {
    200
}
