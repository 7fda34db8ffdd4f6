//! Health checking types and data structures

use crate::monitoring::bounded::BoundedPush;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Outcome classification of a health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Unhealthy => "unhealthy",
            ServiceStatus::Unknown => "unknown",
        };
        f.write_str(status)
    }
}

/// Body a service may return from its health endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDetails {
    pub status: Option<String>,
    pub version: Option<String>,
    pub dependencies: Option<serde_json::Value>,
}

/// Single probe outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    /// Service id
    pub service: String,
    pub status: ServiceStatus,
    /// Probe duration, bounded by the service timeout
    pub response_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Failure classification (if not healthy)
    pub error: Option<String>,
    /// Details reported by the service
    pub details: Option<HealthDetails>,
}

impl HealthCheckResult {
    pub fn new(service: impl Into<String>, status: ServiceStatus, response_time_ms: u64) -> Self {
        Self {
            service: service.into(),
            status,
            response_time_ms,
            timestamp: Utc::now(),
            error: None,
            details: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_details(mut self, details: HealthDetails) -> Self {
        self.details = Some(details);
        self
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Rolling probe history of one service, oldest first
#[derive(Debug, Clone)]
pub struct ServiceHistory {
    results: VecDeque<HealthCheckResult>,
    capacity: usize,
}

impl ServiceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            results: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a result, dropping the oldest beyond capacity
    pub fn push(&mut self, result: HealthCheckResult) {
        self.results.push_bounded(result, self.capacity);
    }

    /// The `n` most recent results, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HealthCheckResult> {
        let skip = self.results.len().saturating_sub(n);
        self.results.iter().skip(skip)
    }

    pub fn latest(&self) -> Option<&HealthCheckResult> {
        self.results.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HealthCheckResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl FromIterator<HealthCheckResult> for ServiceHistory {
    fn from_iter<I: IntoIterator<Item = HealthCheckResult>>(iter: I) -> Self {
        let mut history = ServiceHistory::new(crate::monitoring::bounded::HEALTH_HISTORY_CAPACITY);
        for result in iter {
            history.push(result);
        }
        history
    }
}

/// Health check summary across all services
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    /// Overall status: unhealthy if a critical service is unhealthy,
    /// degraded if any service is not healthy
    pub overall: ServiceStatus,
    /// Latest status per service
    pub services: HashMap<String, ServiceStatus>,
    pub total_services: usize,
    pub healthy_services: usize,
    pub degraded_services: usize,
    pub unhealthy_services: usize,
    pub unknown_services: usize,
    /// Timestamp of the most recent probe
    pub last_check: Option<DateTime<Utc>>,
}
