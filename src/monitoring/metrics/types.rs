//! Derived per-service metrics

use crate::monitoring::alerts::MetricKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of most recent checks used for uptime and error rate
pub const AVAILABILITY_WINDOW: usize = 100;

/// Number of most recent checks averaged for response time
pub const RESPONSE_TIME_WINDOW: usize = 20;

/// Aggregated view of a service's recent health history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetrics {
    pub service: String,
    /// Healthy share of the availability window, in percent
    pub uptime: f64,
    /// Mean response time of the response-time window, in milliseconds
    pub average_response_time: f64,
    /// Unhealthy share of the availability window, in percent
    pub error_rate: f64,
    /// Unhealthy results at the end of the history
    pub consecutive_failures: u32,
    /// Number of checks in the availability window
    pub sample_size: usize,
    pub last_check: Option<DateTime<Utc>>,
}

impl ServiceMetrics {
    pub fn empty(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Default::default()
        }
    }

    /// Value of a metric for rule evaluation; `None` when unavailable
    pub fn value(&self, metric: MetricKind) -> Option<f64> {
        let value = match metric {
            MetricKind::Uptime => self.uptime,
            MetricKind::ResponseTime => self.average_response_time,
            MetricKind::ErrorRate => self.error_rate,
            MetricKind::ConsecutiveFailures => f64::from(self.consecutive_failures),
            MetricKind::Unknown => return None,
        };
        value.is_finite().then_some(value)
    }
}
