//! Threshold rule evaluation

use super::types::{AlertCondition, AlertRule, MatchMode, MetricKind};
use crate::monitoring::health::HealthCheckResult;
use crate::monitoring::metrics::ServiceMetrics;
use crate::monitoring::types::{
    Alert, AlertMetadata, AlertType, ServiceDownMetadata, ThresholdMetadata,
};
use crate::utils::error::{MonitorError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of evaluating all rules for one service
#[derive(Debug, Default)]
pub struct RuleEvaluation {
    /// Candidate alerts of the rules that fired
    pub fired: Vec<Alert>,
    /// Auto-resolving rules whose conditions no longer match
    pub cleared: Vec<String>,
}

/// Evaluation bookkeeping; rules themselves stay plain configuration
#[derive(Debug, Default)]
struct RuleState {
    /// First time each (rule, condition, service) comparison started holding
    condition_since: HashMap<(String, usize, String), Instant>,
    /// Last firing per (rule, service), for cooldowns
    last_fired: HashMap<(String, String), Instant>,
}

/// Evaluates threshold rules against aggregated service metrics
#[derive(Debug, Default)]
pub struct AlertRuleEngine {
    rules: RwLock<Vec<AlertRule>>,
    state: Mutex<RuleState>,
}

impl AlertRuleEngine {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
            state: Mutex::new(RuleState::default()),
        }
    }

    pub fn rules(&self) -> Vec<AlertRule> {
        self.rules.read().clone()
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<AlertRule> {
        self.rules.read().iter().find(|r| r.id == rule_id).cloned()
    }

    /// Add an alert rule, replacing any rule with the same id
    pub fn add_rule(&self, rule: AlertRule) {
        info!("Adding alert rule: {}", rule.name);
        let mut rules = self.rules.write();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
    }

    /// Replace an existing rule
    pub fn update_rule(&self, rule: AlertRule) -> Result<()> {
        let mut rules = self.rules.write();
        let existing = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| MonitorError::not_found(format!("alert rule {}", rule.id)))?;
        info!("Updating alert rule: {}", rule.name);
        *existing = rule;
        Ok(())
    }

    pub fn set_enabled(&self, rule_id: &str, enabled: bool) -> Result<()> {
        let mut rules = self.rules.write();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| MonitorError::not_found(format!("alert rule {}", rule_id)))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// Candidate alerts for `service` given its current metrics
    pub fn evaluate(
        &self,
        service: &str,
        metrics: &ServiceMetrics,
        latest: Option<&HealthCheckResult>,
    ) -> Vec<Alert> {
        self.evaluate_rules(service, metrics, latest).fired
    }

    /// Evaluate every enabled rule for `service`
    pub fn evaluate_rules(
        &self,
        service: &str,
        metrics: &ServiceMetrics,
        latest: Option<&HealthCheckResult>,
    ) -> RuleEvaluation {
        let now = Instant::now();
        let rules = self.rules.read();
        let mut state = self.state.lock();
        let mut evaluation = RuleEvaluation::default();

        for rule in rules.iter().filter(|r| r.enabled) {
            let mut matched: Vec<(&AlertCondition, f64)> = Vec::new();

            for (index, condition) in rule.conditions.iter().enumerate() {
                let key = (rule.id.clone(), index, service.to_string());
                match condition_value(condition, metrics) {
                    Some(value) => {
                        let since = *state.condition_since.entry(key).or_insert(now);
                        let held = condition
                            .duration()
                            .is_none_or(|d| now.duration_since(since) >= d);
                        if held {
                            matched.push((condition, value));
                        }
                    }
                    None => {
                        state.condition_since.remove(&key);
                    }
                }
            }

            let fires = match rule.match_mode {
                MatchMode::Any => !matched.is_empty(),
                MatchMode::All => {
                    !rule.conditions.is_empty() && matched.len() == rule.conditions.len()
                }
            };

            if !fires {
                if rule.auto_resolve {
                    evaluation.cleared.push(rule.id.clone());
                }
                continue;
            }

            let fire_key = (rule.id.clone(), service.to_string());
            let cooling_down = state
                .last_fired
                .get(&fire_key)
                .is_some_and(|last| now.duration_since(*last) < rule.cooldown());
            if cooling_down {
                debug!(rule = %rule.id, service, "Rule in cooldown, not firing");
                continue;
            }
            state.last_fired.insert(fire_key, now);

            let (condition, value) = matched[0];
            evaluation
                .fired
                .push(build_alert(rule, condition, value, service, latest));
        }

        evaluation
    }
}

/// Current value of the condition's metric if the comparison holds
fn condition_value(condition: &AlertCondition, metrics: &ServiceMetrics) -> Option<f64> {
    let Some(value) = metrics.value(condition.metric) else {
        debug!(metric = %condition.metric, "Metric unavailable, condition does not match");
        return None;
    };
    condition
        .operator
        .compare(value, condition.threshold)
        .then_some(value)
}

fn build_alert(
    rule: &AlertRule,
    condition: &AlertCondition,
    value: f64,
    service: &str,
    latest: Option<&HealthCheckResult>,
) -> Alert {
    let alert_type = AlertType::for_metric(condition.metric);
    let last_error = latest.and_then(|r| r.error.clone());

    let threshold = ThresholdMetadata {
        rule_id: rule.id.clone(),
        metric: condition.metric,
        operator: condition.operator,
        threshold: condition.threshold,
        value,
    };
    let metadata = match condition.metric {
        MetricKind::ResponseTime => AlertMetadata::ResponseTime(threshold),
        MetricKind::ErrorRate => AlertMetadata::ErrorRate(threshold),
        MetricKind::Uptime => AlertMetadata::Uptime(threshold),
        MetricKind::ConsecutiveFailures | MetricKind::Unknown => {
            AlertMetadata::ServiceDown(ServiceDownMetadata {
                rule_id: rule.id.clone(),
                operator: condition.operator,
                threshold: condition.threshold,
                consecutive_failures: value as u32,
                last_error: last_error.clone(),
            })
        }
    };

    let mut message = format!(
        "Rule '{}' triggered for {}: {} {} {} (current value: {:.2})",
        rule.name, service, condition.metric, condition.operator, condition.threshold, value
    );
    if let Some(error) = &last_error {
        message.push_str(&format!("; last error: {}", error));
    }

    Alert::new(
        alert_type,
        rule.severity,
        format!("{}: {}", rule.name, service),
        message,
    )
    .with_service(service)
    .with_channels(rule.channels.clone())
    .with_metadata(metadata)
}
