//! Core MonitoringSystem implementation

use crate::config::Config;
use crate::utils::error::{MonitorError, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::alerts::{
    AlertEvent, AlertEventBus, AlertManager, AlertRuleEngine, AlertStats, NotificationDispatcher,
};
use super::health::{HealthCheckResult, HealthPoller, HealthSummary};
use super::metrics::{MetricsAggregator, ServiceMetrics};
use super::registry::ServiceRegistry;
use super::types::Alert;

/// Point-in-time view of the whole pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub health: HealthSummary,
    pub metrics: HashMap<String, ServiceMetrics>,
    pub active_alerts: Vec<Alert>,
    pub alert_stats: AlertStats,
    /// Seconds since the system was created
    pub uptime_secs: u64,
}

/// Health polling and alerting context.
///
/// Constructed once and shared by cloning; every clone drives the same state.
#[derive(Debug, Clone)]
pub struct MonitoringSystem {
    pub(super) registry: Arc<ServiceRegistry>,
    /// Health poller
    pub(super) health: HealthPoller,
    pub(super) metrics: Arc<MetricsAggregator>,
    pub(super) rules: Arc<AlertRuleEngine>,
    /// Alert manager
    pub(super) alerts: AlertManager,
    pub(super) poll_interval: Duration,
    pub(super) cleanup_interval: Duration,
    /// Set while a polling round runs
    pub(super) in_flight: Arc<AtomicBool>,
    /// Whether the background tasks are running
    pub(super) active: Arc<AtomicBool>,
    pub(super) tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    /// System start time
    pub(super) start_time: Instant,
}

/// Clears the in-flight flag when a round ends, even if it is cancelled
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MonitoringSystem {
    /// Create a new monitoring system
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing monitoring system");

        let registry = Arc::new(ServiceRegistry::new(config.services.clone())?);
        let health = HealthPoller::new(registry.clone(), config.monitoring.history_capacity)?;

        let events = AlertEventBus::new(config.alerting.event_buffer);
        let dispatcher = NotificationDispatcher::new(config.alerting.channels.clone(), events)?;
        let critical_services = registry
            .iter()
            .filter(|s| s.critical)
            .map(|s| s.id.clone());
        let alerts = AlertManager::new(&config.alerting, dispatcher, critical_services);

        info!(
            services = registry.len(),
            rules = config.alerting.rules.len(),
            "Monitoring system initialized successfully"
        );

        Ok(Self {
            registry,
            health,
            metrics: Arc::new(MetricsAggregator::new()),
            rules: Arc::new(AlertRuleEngine::new(config.alerting.rules.clone())),
            alerts,
            poll_interval: config.monitoring.poll_interval(),
            cleanup_interval: config.alerting.cleanup_interval(),
            in_flight: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicBool::new(false)),
            tasks: Arc::new(Mutex::new(Vec::new())),
            start_time: Instant::now(),
        })
    }

    /// Start periodic polling and cleanup
    pub async fn start(&self) -> Result<()> {
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(MonitorError::monitoring("Monitoring system already started"));
        }

        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Starting monitoring system"
        );
        self.start_background_tasks();
        Ok(())
    }

    /// Stop background tasks and cancel pending escalations
    pub async fn stop(&self) -> Result<()> {
        if self.active.swap(false, Ordering::AcqRel) {
            info!("Stopping monitoring system");
            for handle in self.tasks.lock().drain(..) {
                handle.abort();
            }
        }
        self.alerts.shutdown();

        info!("Monitoring system stopped");
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Get system uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Probe one service and run its result through the pipeline
    pub async fn check_service_health(&self, service_id: &str) -> Result<HealthCheckResult> {
        let result = self.health.check_service_health(service_id).await?;
        self.process_result(&result).await;
        Ok(result)
    }

    /// Probe every service and run the results through the pipeline.
    ///
    /// Returns `None` without probing when another round is in flight.
    pub async fn run_health_checks(&self) -> Option<HashMap<String, HealthCheckResult>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Health check round already in flight, skipping");
            return None;
        }
        let _guard = InFlightGuard(&self.in_flight);

        debug!("Running health checks");
        let results = self.health.check_all_services().await;
        for result in results.values() {
            self.process_result(result).await;
        }
        Some(results)
    }

    /// Recompute metrics for the result's service, evaluate rules and process alerts.
    ///
    /// Returns the alerts that were created.
    pub async fn process_result(&self, result: &HealthCheckResult) -> Vec<Alert> {
        let service = result.service.as_str();
        let metrics = self
            .health
            .with_history(service, |history| self.metrics.update(service, history))
            .unwrap_or_else(|| ServiceMetrics::empty(service));

        let evaluation = self.rules.evaluate_rules(service, &metrics, Some(result));

        for rule_id in &evaluation.cleared {
            let resolved = self.alerts.resolve_for_rule(rule_id, service);
            if !resolved.is_empty() {
                info!(rule = %rule_id, service, count = resolved.len(), "Auto-resolved alerts");
            }
        }

        let mut created = Vec::new();
        for candidate in evaluation.fired {
            match self.alerts.process_alert(candidate).await {
                Ok(Some(alert)) => created.push(alert),
                Ok(None) => {}
                Err(e) => warn!(service, "Failed to process alert: {}", e),
            }
        }
        created
    }

    /// Subscribe to alerts delivered through browser channels
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.alerts.dispatcher().events().subscribe()
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn health(&self) -> &HealthPoller {
        &self.health
    }

    pub fn health_summary(&self) -> HealthSummary {
        self.health.summary()
    }

    /// Latest metrics of a service; zeros before its first probe
    pub fn service_metrics(&self, service_id: &str) -> ServiceMetrics {
        self.metrics.get(service_id)
    }

    pub fn rules(&self) -> &Arc<AlertRuleEngine> {
        &self.rules
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    /// Snapshot of health, metrics and open alerts
    pub fn status(&self) -> StatusReport {
        StatusReport {
            health: self.health.summary(),
            metrics: self.metrics.all(),
            active_alerts: self.alerts.active_alerts(),
            alert_stats: self.alerts.stats(),
            uptime_secs: self.uptime().as_secs(),
        }
    }
}
