//! Alert lifecycle management

use super::dispatcher::NotificationDispatcher;
use super::types::{AlertFilter, AlertStats, AlertStorage, EscalationRule};
use crate::config::AlertingConfig;
use crate::monitoring::bounded::BoundedPush;
use crate::monitoring::scheduler::DeferredTasks;
use crate::monitoring::types::{Alert, AlertMetadata};
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Default number of alerts returned by [`AlertManager::history`]
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Deduplicates, stores, acknowledges, resolves and escalates alerts
#[derive(Debug, Clone)]
pub struct AlertManager {
    /// Candidates of the same (type, service) inside this window are suppressed
    pub(super) duplicate_window: Duration,
    /// Resolved alerts older than this are purged by cleanup
    pub(super) retention: chrono::Duration,
    pub(super) max_history: usize,
    /// Consolidated storage for alerts, history and stats
    pub(super) storage: Arc<RwLock<AlertStorage>>,
    /// Last sighting per suppression key
    pub(super) suppression: Arc<DashMap<String, Instant>>,
    /// Escalation timers keyed by original alert id
    pub(super) escalations: DeferredTasks,
    pub(super) escalation_rules: Arc<RwLock<Vec<EscalationRule>>>,
    pub(super) dispatcher: NotificationDispatcher,
    /// Services whose escalations are raised one severity level
    pub(super) critical_services: Arc<HashSet<String>>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new<I>(config: &AlertingConfig, dispatcher: NotificationDispatcher, critical_services: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            duplicate_window: config.duplicate_window(),
            retention: chrono::Duration::days(i64::from(config.retention_days)),
            max_history: config.max_history,
            storage: Arc::new(RwLock::new(AlertStorage::default())),
            suppression: Arc::new(DashMap::new()),
            escalations: DeferredTasks::new(),
            escalation_rules: Arc::new(RwLock::new(config.escalation.clone())),
            dispatcher,
            critical_services: Arc::new(critical_services.into_iter().collect()),
        }
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Run a candidate alert through suppression, storage, delivery and escalation.
    ///
    /// Returns `None` when the candidate duplicates a recent alert.
    pub async fn process_alert(&self, candidate: Alert) -> Result<Option<Alert>> {
        if self.storage.read().alerts.contains_key(&candidate.id) {
            return Err(MonitorError::alert(format!(
                "Alert {} already exists",
                candidate.id
            )));
        }

        if self.is_duplicate(&candidate.suppression_key()) {
            debug!(
                alert_type = %candidate.alert_type,
                service = candidate.service.as_deref().unwrap_or("-"),
                "Suppressing duplicate alert"
            );
            self.storage.write().stats.suppressed_alerts += 1;
            return Ok(None);
        }

        self.store(&candidate);
        info!(
            alert_id = %candidate.id,
            severity = %candidate.severity,
            alert_type = %candidate.alert_type,
            "Alert created: {}",
            candidate.title
        );

        self.arm_escalations(&candidate);
        self.deliver(&candidate).await;

        Ok(Some(candidate))
    }

    /// Check and refresh the suppression entry of `key` in one step
    fn is_duplicate(&self, key: &str) -> bool {
        let now = Instant::now();
        match self.suppression.entry(key.to_string()) {
            Entry::Occupied(mut last_seen) => {
                let duplicate = now.duration_since(*last_seen.get()) < self.duplicate_window;
                last_seen.insert(now);
                duplicate
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        }
    }

    /// Insert into the alert map and the bounded history
    pub(super) fn store(&self, alert: &Alert) {
        let mut guard = self.storage.write();
        self.store_locked(&mut guard, alert);
    }

    /// [`store`](Self::store) for callers already holding the storage lock
    pub(super) fn store_locked(&self, storage: &mut AlertStorage, alert: &Alert) {
        storage.stats.record(alert);
        storage.alerts.insert(alert.id.clone(), alert.clone());
        if let Some(evicted) = storage
            .history
            .push_front_bounded(alert.id.clone(), self.max_history)
        {
            storage.alerts.remove(&evicted);
            self.escalations.cancel(&evicted);
        }
    }

    /// Dispatch to the alert's channels and count failed deliveries
    pub(super) async fn deliver(&self, alert: &Alert) {
        let report = self.dispatcher.dispatch(alert).await;
        if report.failure_count() > 0 {
            self.storage.write().stats.failed_notifications += report.failure_count() as u64;
        }
    }

    /// Acknowledge an alert and cancel its pending escalations.
    ///
    /// Acknowledging an already acknowledged alert changes nothing.
    pub fn acknowledge_alert(&self, alert_id: &str, by: &str) -> Result<Alert> {
        let alert = {
            let mut guard = self.storage.write();
            let storage = &mut *guard;
            let alert = storage
                .alerts
                .get_mut(alert_id)
                .ok_or_else(|| MonitorError::not_found(format!("Alert {}", alert_id)))?;

            if alert.acknowledged {
                return Ok(alert.clone());
            }

            let now = Utc::now();
            alert.acknowledged = true;
            alert.acknowledged_by = Some(by.to_string());
            alert.acknowledged_at = Some(now);
            let acknowledged = alert.clone();

            let mut count = 1;
            for escalated in escalations_of(storage, alert_id) {
                if !escalated.acknowledged {
                    escalated.acknowledged = true;
                    escalated.acknowledged_by = Some(by.to_string());
                    escalated.acknowledged_at = Some(now);
                    count += 1;
                }
            }
            storage.stats.acknowledged_alerts += count;
            acknowledged
        };

        let cancelled = self.escalations.cancel(alert_id);
        info!(alert_id, by, cancelled, "Alert acknowledged");
        Ok(alert)
    }

    /// Resolve an alert and cancel its pending escalations
    pub fn resolve_alert(&self, alert_id: &str, by: &str, note: Option<String>) -> Result<Alert> {
        let alert = {
            let mut guard = self.storage.write();
            let storage = &mut *guard;
            let alert = storage
                .alerts
                .get_mut(alert_id)
                .ok_or_else(|| MonitorError::not_found(format!("Alert {}", alert_id)))?;

            if alert.resolved {
                return Ok(alert.clone());
            }

            let now = Utc::now();
            alert.resolved = true;
            alert.resolved_by = Some(by.to_string());
            alert.resolved_at = Some(now);
            alert.resolution_note = note;
            let resolved = alert.clone();

            let mut count = 1;
            for escalated in escalations_of(storage, alert_id) {
                if !escalated.resolved {
                    escalated.resolved = true;
                    escalated.resolved_by = Some(by.to_string());
                    escalated.resolved_at = Some(now);
                    escalated.resolution_note = resolved.resolution_note.clone();
                    count += 1;
                }
            }
            storage.stats.resolved_alerts += count;
            resolved
        };

        // A recurrence after resolution is a new incident, not a duplicate
        self.suppression.remove(&alert.suppression_key());

        let cancelled = self.escalations.cancel(alert_id);
        info!(alert_id, by, cancelled, "Alert resolved");
        Ok(alert)
    }

    /// Resolve the open alerts raised by `rule_id` for `service`
    pub fn resolve_for_rule(&self, rule_id: &str, service: &str) -> Vec<Alert> {
        let ids: Vec<String> = self
            .storage
            .read()
            .alerts
            .values()
            .filter(|a| {
                !a.resolved
                    && a.service.as_deref() == Some(service)
                    && a.metadata.rule_id() == Some(rule_id)
            })
            .map(|a| a.id.clone())
            .collect();

        ids.iter()
            .filter_map(|id| {
                self.resolve_alert(id, "auto-resolve", Some("Conditions cleared".to_string()))
                    .ok()
            })
            .collect()
    }

    pub fn get_alert(&self, alert_id: &str) -> Option<Alert> {
        self.storage.read().alerts.get(alert_id).cloned()
    }

    /// Alerts matching `filter`, newest first
    pub fn get_alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        let storage = self.storage.read();
        storage
            .history
            .iter()
            .filter_map(|id| storage.alerts.get(id))
            .filter(|alert| filter.matches(alert))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Unresolved alerts, newest first
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.get_alerts(&AlertFilter::unresolved())
    }

    /// Get alert history, newest first
    pub fn history(&self, limit: Option<usize>) -> Vec<Alert> {
        let storage = self.storage.read();
        storage
            .history
            .iter()
            .filter_map(|id| storage.alerts.get(id))
            .take(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .cloned()
            .collect()
    }

    /// Get alert statistics
    pub fn stats(&self) -> AlertStats {
        self.storage.read().stats.clone()
    }

    pub fn escalation_rules(&self) -> Vec<EscalationRule> {
        self.escalation_rules.read().clone()
    }

    /// Replace the escalation rules; already armed timers keep their rule
    pub fn set_escalation_rules(&self, rules: Vec<EscalationRule>) {
        *self.escalation_rules.write() = rules;
    }

    /// Escalation timers still armed for `alert_id`
    pub fn pending_escalations(&self, alert_id: &str) -> usize {
        self.escalations.pending(alert_id)
    }

    /// Purge expired alerts and suppression entries
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    /// Purge resolved alerts created before `now - retention`; returns how many were removed
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let purged = {
            let mut guard = self.storage.write();
            let storage = &mut *guard;
            let before = storage.alerts.len();
            storage
                .alerts
                .retain(|_, alert| !(alert.resolved && alert.timestamp < cutoff));
            let alerts = &storage.alerts;
            storage.history.retain(|id| alerts.contains_key(id));
            before - storage.alerts.len()
        };

        let window = self.duplicate_window;
        let instant_now = Instant::now();
        self.suppression
            .retain(|_, last_seen| instant_now.duration_since(*last_seen) < window);

        if purged > 0 {
            info!(purged, "Cleaned up resolved alerts");
        }
        purged
    }

    /// Abort every pending escalation
    pub fn shutdown(&self) {
        let cancelled = self.escalations.cancel_all();
        debug!(cancelled, "Alert manager shut down");
    }
}

/// Stored escalation alerts raised for `original_id`
fn escalations_of<'a>(
    storage: &'a mut AlertStorage,
    original_id: &'a str,
) -> impl Iterator<Item = &'a mut Alert> + 'a {
    storage.alerts.values_mut().filter(move |alert| {
        matches!(
            &alert.metadata,
            AlertMetadata::Escalation(meta) if meta.original_alert_id == original_id
        )
    })
}
