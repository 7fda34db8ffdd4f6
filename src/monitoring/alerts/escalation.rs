//! Escalation of alerts left unacknowledged

use super::manager::AlertManager;
use super::types::EscalationRule;
use crate::monitoring::types::{Alert, AlertMetadata, AlertType, EscalationMetadata};
use tracing::{debug, warn};

impl AlertManager {
    /// Arm one timer per escalation rule matching the alert's severity
    pub(super) fn arm_escalations(&self, alert: &Alert) {
        if alert.alert_type == AlertType::Escalation {
            return;
        }

        let rules: Vec<EscalationRule> = self
            .escalation_rules
            .read()
            .iter()
            .filter(|rule| rule.severity == alert.severity)
            .cloned()
            .collect();

        for rule in rules {
            self.schedule_escalation(alert.id.clone(), rule, 1);
        }
    }

    fn schedule_escalation(&self, alert_id: String, rule: EscalationRule, level: u32) {
        if level > rule.max_escalations {
            return;
        }

        debug!(
            alert_id = %alert_id,
            level,
            after_ms = rule.escalate_after_ms,
            "Arming escalation"
        );
        let manager = self.clone();
        let key = alert_id.clone();
        self.escalations
            .schedule(key, rule.escalate_after(), async move {
                manager.escalate(&alert_id, &rule, level).await;
            });
    }

    /// Raise an escalated alert for `alert_id` if it is still open.
    ///
    /// Re-arms while `level` is below the rule's `max_escalations`.
    pub(super) async fn escalate(
        &self,
        alert_id: &str,
        rule: &EscalationRule,
        level: u32,
    ) -> Option<Alert> {
        // Open check and insert under one guard
        let escalated = {
            let mut guard = self.storage.write();
            let original = match guard.alerts.get(alert_id) {
                Some(alert) if alert.is_open() => alert,
                _ => {
                    debug!(alert_id, "Skipping escalation of closed alert");
                    return None;
                }
            };
            let escalated = self.escalation_alert(original, rule, level);

            self.store_locked(&mut guard, &escalated);
            guard.stats.escalated_alerts += 1;
            escalated
        };
        warn!(
            alert_id,
            escalated_id = %escalated.id,
            severity = %escalated.severity,
            level,
            "Alert escalated"
        );

        self.deliver(&escalated).await;

        if level < rule.max_escalations {
            self.schedule_escalation(alert_id.to_string(), rule.clone(), level + 1);
        }

        Some(escalated)
    }

    fn escalation_alert(&self, original: &Alert, rule: &EscalationRule, level: u32) -> Alert {
        let critical_service = original
            .service
            .as_deref()
            .is_some_and(|s| self.critical_services.contains(s));
        let severity = if critical_service {
            original.severity.raised()
        } else {
            original.severity
        };

        let mut escalated = Alert::new(
            AlertType::Escalation,
            severity,
            format!("ESCALATED: {}", original.title),
            format!(
                "Alert not acknowledged within {}s (escalation {} of {}): {}",
                rule.escalate_after().as_secs(),
                level,
                rule.max_escalations,
                original.message
            ),
        )
        .with_channels(rule.escalate_to.clone())
        .with_metadata(AlertMetadata::Escalation(EscalationMetadata {
            original_alert_id: original.id.clone(),
            original_type: original.alert_type,
            escalation_level: level,
            max_escalations: rule.max_escalations,
        }));
        escalated.service = original.service.clone();
        escalated
    }
}
