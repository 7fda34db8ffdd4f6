//! Monitoring configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::monitoring::ServiceDescriptor;
use std::collections::HashSet;
use tracing::debug;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Validate for ServiceDescriptor {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Service id cannot be empty".to_string());
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "Service {} base_url must start with http:// or https://",
                self.id
            ));
        }

        if !self.health_path.starts_with('/') {
            return Err(format!("Service {} health_path must start with '/'", self.id));
        }

        if self.timeout_ms == 0 {
            return Err(format!("Service {} timeout must be greater than 0", self.id));
        }

        Ok(())
    }
}

/// Validate every service and reject duplicate ids
pub fn validate_services(services: &[ServiceDescriptor]) -> Result<(), String> {
    debug!("Validating {} services", services.len());

    let mut seen = HashSet::new();
    for service in services {
        service.validate()?;
        if !seen.insert(service.id.as_str()) {
            return Err(format!("Duplicate service id: {}", service.id));
        }
    }
    Ok(())
}

impl Validate for MonitoringConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating monitoring configuration");

        if self.poll_interval_secs == 0 {
            return Err("Poll interval must be greater than 0".to_string());
        }

        if self.history_capacity == 0 {
            return Err("History capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        // Plain levels are checked; anything else is treated as an EnvFilter directive
        let level = self.level.trim();
        if level.is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        if !level.contains(['=', ',']) && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            return Err(format!("Unknown log level: {}", self.level));
        }
        Ok(())
    }
}
