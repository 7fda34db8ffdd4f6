//! Monitoring configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health polling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Run the periodic polling loop
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between two polling rounds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Results kept per service
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval_secs(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl MonitoringConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
