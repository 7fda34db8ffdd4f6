//! Registry of monitored services

use crate::utils::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Identity of a monitored dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Short service id (e.g. `ac`, `gs`)
    pub id: String,
    /// Human readable service name
    pub name: String,
    /// Base address, without trailing slash
    pub base_url: String,
    /// Path of the health endpoint
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Whether the service is critical for the platform
    #[serde(default)]
    pub critical: bool,
    /// Per-probe timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl ServiceDescriptor {
    /// Create a descriptor with the default health path and timeout
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
            health_path: default_health_path(),
            critical: false,
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Probe timeout
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.health_path.starts_with('/') {
            format!("{}{}", base, self.health_path)
        } else {
            format!("{}/{}", base, self.health_path)
        }
    }
}

/// Static table of monitored services, fixed at process start
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Vec<ServiceDescriptor>,
    index: HashMap<String, usize>,
}

impl ServiceRegistry {
    /// Build a registry, rejecting duplicate ids
    pub fn new(services: Vec<ServiceDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(services.len());
        for (position, service) in services.iter().enumerate() {
            if index.insert(service.id.clone(), position).is_some() {
                return Err(MonitorError::config(format!(
                    "Duplicate service id: {}",
                    service.id
                )));
            }
        }

        Ok(Self { services, index })
    }

    pub fn get(&self, service_id: &str) -> Option<&ServiceDescriptor> {
        self.index.get(service_id).map(|&i| &self.services[i])
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.index.contains_key(service_id)
    }

    pub fn is_critical(&self, service_id: &str) -> bool {
        self.get(service_id).is_some_and(|s| s.critical)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.services.iter().map(|s| s.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
