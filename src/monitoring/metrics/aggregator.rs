//! Metric recomputation over health histories

use super::types::{AVAILABILITY_WINDOW, RESPONSE_TIME_WINDOW, ServiceMetrics};
use crate::monitoring::health::{ServiceHistory, ServiceStatus};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Recompute a service's metrics from its history.
///
/// Empty histories yield all-zero metrics.
pub fn compute_metrics(service: &str, history: &ServiceHistory) -> ServiceMetrics {
    if history.is_empty() {
        return ServiceMetrics::empty(service);
    }

    let window: Vec<_> = history.recent(AVAILABILITY_WINDOW).collect();
    let sample_size = window.len();
    let healthy = window
        .iter()
        .filter(|r| r.status == ServiceStatus::Healthy)
        .count();
    let unhealthy = window
        .iter()
        .filter(|r| r.status == ServiceStatus::Unhealthy)
        .count();

    let (sum, count) = history
        .recent(RESPONSE_TIME_WINDOW)
        .fold((0u64, 0usize), |(sum, count), r| {
            (sum + r.response_time_ms, count + 1)
        });
    let average_response_time = if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    };

    let consecutive_failures = history
        .iter()
        .rev()
        .take_while(|r| r.status == ServiceStatus::Unhealthy)
        .count() as u32;

    ServiceMetrics {
        service: service.to_string(),
        uptime: percentage(healthy, sample_size),
        average_response_time,
        error_rate: percentage(unhealthy, sample_size),
        consecutive_failures,
        sample_size,
        last_check: history.latest().map(|r| r.timestamp),
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (100.0 * part as f64 / total as f64).clamp(0.0, 100.0)
    }
}

/// Owner of the latest metrics of every service
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    metrics: RwLock<HashMap<String, ServiceMetrics>>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute and store the metrics of `service`
    pub fn update(&self, service: &str, history: &ServiceHistory) -> ServiceMetrics {
        let metrics = compute_metrics(service, history);
        debug!(
            service,
            uptime = metrics.uptime,
            error_rate = metrics.error_rate,
            average_response_time = metrics.average_response_time,
            "Service metrics updated"
        );
        self.metrics
            .write()
            .insert(service.to_string(), metrics.clone());
        metrics
    }

    /// Latest metrics of `service`; zeros if it was never checked
    pub fn get(&self, service: &str) -> ServiceMetrics {
        self.metrics
            .read()
            .get(service)
            .cloned()
            .unwrap_or_else(|| ServiceMetrics::empty(service))
    }

    pub fn all(&self) -> HashMap<String, ServiceMetrics> {
        self.metrics.read().clone()
    }
}
