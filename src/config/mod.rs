//! Configuration management
//!
//! Configuration comes from a YAML file or from the environment; every field
//! has a default so partial files are valid.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::monitoring::ServiceDescriptor;
use crate::utils::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable enabling the webhook channel
pub const WEBHOOK_URL_VAR: &str = "ALERT_WEBHOOK_URL";
/// Environment variable overriding the polling interval
pub const POLL_INTERVAL_VAR: &str = "GOVWATCH_POLL_INTERVAL_SECS";
/// Environment variable overriding the log level
pub const LOG_LEVEL_VAR: &str = "GOVWATCH_LOG_LEVEL";

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Services to monitor
    #[serde(default = "default_services")]
    pub services: Vec<ServiceDescriptor>,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: default_services(),
            monitoring: MonitoringConfig::default(),
            alerting: AlertingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MonitorError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| MonitorError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, reading `.env` first
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }

        let mut config = Self {
            services: services_from_env(),
            ..Self::default()
        };

        if let Ok(secs) = std::env::var(POLL_INTERVAL_VAR) {
            config.monitoring.poll_interval_secs = secs.trim().parse().map_err(|e| {
                MonitorError::Config(format!("Invalid {}: {}", POLL_INTERVAL_VAR, e))
            })?;
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_VAR) {
            config.logging.level = level;
        }
        if let Some(url) = std::env::var(WEBHOOK_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            config.alerting = config.alerting.with_webhook(url);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        validation::validate_services(&self.services)
            .map_err(|e| MonitorError::Config(format!("Services config error: {}", e)))?;

        self.monitoring
            .validate()
            .map_err(|e| MonitorError::Config(format!("Monitoring config error: {}", e)))?;

        self.alerting
            .validate()
            .map_err(|e| MonitorError::Config(format!("Alerting config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| MonitorError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MonitorError::Config(format!("Failed to serialize config to JSON: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MonitorError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
