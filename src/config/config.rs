use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::demo::DemoConfig;
use super::logging::LoggingConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SCRAPEDEMO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const ENV_PREFIX: &str = "SCRAPEDEMO_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl ConfigV1 {
    /// Checks constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let rate = self.demo.error_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!(
                "demo.error_rate must lie in [0, 1], got {}",
                rate
            ));
        }
        if self.demo.origin.is_empty() {
            return Err("demo.origin must not be empty".to_string());
        }
        Ok(())
    }
}

/// Extracts and validates a config from an assembled figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, String> {
    let config = match figment.extract::<Config>().map_err(|e| e.to_string())? {
        Config::ConfigV1(c) => c,
    };
    config.validate()?;
    Ok(config)
}

/// Load config from the YAML file (default "./config.yaml"), with
/// `SCRAPEDEMO_`-prefixed environment variables taking precedence.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let figment = Figment::new()
        .merge(Yaml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"));

    match extract_config(figment) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
