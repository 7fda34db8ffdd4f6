//! Core health poller implementation

use crate::monitoring::registry::{ServiceDescriptor, ServiceRegistry};
use crate::utils::error::{MonitorError, Result};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::types::{HealthCheckResult, HealthSummary, ServiceHistory, ServiceStatus};

/// Probes the registered services and keeps their rolling history
#[derive(Debug, Clone)]
pub struct HealthPoller {
    /// Services to probe
    pub(super) registry: Arc<ServiceRegistry>,
    /// Shared HTTP client; per-request timeouts come from the descriptors
    pub(super) client: reqwest::Client,
    /// Probe history per service id
    pub(super) histories: Arc<RwLock<HashMap<String, ServiceHistory>>>,
    pub(super) history_capacity: usize,
}

impl HealthPoller {
    /// Create a new health poller
    pub fn new(registry: Arc<ServiceRegistry>, history_capacity: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("govwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            registry,
            client,
            histories: Arc::new(RwLock::new(HashMap::new())),
            history_capacity,
        })
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Probe one service and append the result to its history
    pub async fn check_service_health(&self, service_id: &str) -> Result<HealthCheckResult> {
        let service = self
            .registry
            .get(service_id)
            .ok_or_else(|| MonitorError::not_found(format!("service {}", service_id)))?;

        Ok(self.check_descriptor(service).await)
    }

    /// Probe every registered service concurrently.
    ///
    /// Always yields one result per service: probe failures are recorded as
    /// unhealthy results rather than returned as errors.
    pub async fn check_all_services(&self) -> HashMap<String, HealthCheckResult> {
        debug!("Checking {} services", self.registry.len());

        let probes = self
            .registry
            .iter()
            .map(|service| self.check_descriptor(service));

        join_all(probes)
            .await
            .into_iter()
            .map(|result| (result.service.clone(), result))
            .collect()
    }

    async fn check_descriptor(&self, service: &ServiceDescriptor) -> HealthCheckResult {
        let result = self.probe(service).await;
        self.record(result.clone());
        result
    }

    /// Append a result to the history of its service
    pub fn record(&self, result: HealthCheckResult) {
        let mut histories = self.histories.write();
        histories
            .entry(result.service.clone())
            .or_insert_with(|| ServiceHistory::new(self.history_capacity))
            .push(result);
    }

    /// Run `f` against a service's history
    pub fn with_history<R>(&self, service_id: &str, f: impl FnOnce(&ServiceHistory) -> R) -> Option<R> {
        let histories = self.histories.read();
        histories.get(service_id).map(f)
    }

    /// Snapshot of a service's history, oldest first
    pub fn history(&self, service_id: &str) -> Vec<HealthCheckResult> {
        self.with_history(service_id, |h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Latest result of a service
    pub fn latest(&self, service_id: &str) -> Option<HealthCheckResult> {
        self.with_history(service_id, |h| h.latest().cloned())
            .flatten()
    }

    /// Latest status of a service; `Unknown` before the first probe
    pub fn service_status(&self, service_id: &str) -> ServiceStatus {
        self.latest(service_id)
            .map(|r| r.status)
            .unwrap_or(ServiceStatus::Unknown)
    }

    /// Summarize the latest status of every service
    pub fn summary(&self) -> HealthSummary {
        let histories = self.histories.read();
        let mut services = HashMap::with_capacity(self.registry.len());
        let mut last_check = None;
        let mut critical_down = false;

        for service in self.registry.iter() {
            let latest = histories.get(&service.id).and_then(|h| h.latest());
            let status = latest.map(|r| r.status).unwrap_or(ServiceStatus::Unknown);
            if let Some(result) = latest {
                last_check = last_check.max(Some(result.timestamp));
            }
            if service.critical && status == ServiceStatus::Unhealthy {
                critical_down = true;
            }
            services.insert(service.id.clone(), status);
        }

        let count = |wanted: ServiceStatus| services.values().filter(|s| **s == wanted).count();
        let healthy_services = count(ServiceStatus::Healthy);
        let degraded_services = count(ServiceStatus::Degraded);
        let unhealthy_services = count(ServiceStatus::Unhealthy);
        let unknown_services = count(ServiceStatus::Unknown);

        let overall = if critical_down {
            ServiceStatus::Unhealthy
        } else if services.is_empty() || unknown_services == services.len() {
            ServiceStatus::Unknown
        } else if healthy_services == services.len() {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        };

        HealthSummary {
            overall,
            total_services: services.len(),
            services,
            healthy_services,
            degraded_services,
            unhealthy_services,
            unknown_services,
            last_check,
        }
    }
}
