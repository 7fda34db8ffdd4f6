//! Alerting configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::monitoring::alerts::{
    AlertRule, ChannelConfig, ChannelSettings, EscalationRule, MetricKind,
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Upper bound on alert retention
const MAX_RETENTION_DAYS: u32 = 3650;

impl Validate for AlertingConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating alerting configuration");

        if self.cleanup_interval_secs == 0 {
            return Err("Cleanup interval must be greater than 0".to_string());
        }

        if self.max_history == 0 {
            return Err("Max history must be greater than 0".to_string());
        }

        if self.event_buffer == 0 {
            return Err("Event buffer must be greater than 0".to_string());
        }

        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(format!(
                "Retention cannot exceed {} days",
                MAX_RETENTION_DAYS
            ));
        }

        let mut channel_ids = HashSet::new();
        for channel in &self.channels {
            channel.validate()?;
            if !channel_ids.insert(channel.id.as_str()) {
                return Err(format!("Duplicate channel id: {}", channel.id));
            }
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(format!("Duplicate rule id: {}", rule.id));
            }
            check_channel_refs(&rule.channels, &channel_ids, &format!("Rule {}", rule.id))?;
        }

        for escalation in &self.escalation {
            escalation.validate()?;
            check_channel_refs(
                &escalation.escalate_to,
                &channel_ids,
                &format!("Escalation for {:?}", escalation.severity),
            )?;
        }

        Ok(())
    }
}

fn check_channel_refs(refs: &[String], known: &HashSet<&str>, owner: &str) -> Result<(), String> {
    match refs.iter().find(|id| !known.contains(id.as_str())) {
        Some(unknown) => Err(format!("{} references unknown channel: {}", owner, unknown)),
        None => Ok(()),
    }
}

impl Validate for AlertRule {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Rule id cannot be empty".to_string());
        }

        if self.conditions.is_empty() {
            return Err(format!("Rule {} must have at least one condition", self.id));
        }

        for condition in &self.conditions {
            if !condition.threshold.is_finite() {
                return Err(format!("Rule {} has a non-finite threshold", self.id));
            }
            if condition.metric == MetricKind::Unknown {
                // Kept loadable; the condition never matches
                warn!(rule = %self.id, "Rule references an unknown metric");
            }
        }

        Ok(())
    }
}

impl Validate for ChannelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Channel id cannot be empty".to_string());
        }

        if self.severity_filter.is_empty() {
            return Err(format!("Channel {} severity filter cannot be empty", self.id));
        }

        if let ChannelSettings::Webhook { url, .. } = &self.settings {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!(
                    "Channel {} webhook url must start with http:// or https://",
                    self.id
                ));
            }
        }

        Ok(())
    }
}

impl Validate for EscalationRule {
    fn validate(&self) -> Result<(), String> {
        if self.escalate_after_ms == 0 {
            return Err(format!(
                "Escalation for {:?} must have a positive delay",
                self.severity
            ));
        }

        if self.escalate_to.is_empty() {
            return Err(format!(
                "Escalation for {:?} must notify at least one channel",
                self.severity
            ));
        }

        Ok(())
    }
}
