//! Alert types and data structures

use crate::monitoring::types::{Alert, AlertSeverity, AlertType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Consolidated alert storage - single lock for related data
#[derive(Debug, Default)]
pub(super) struct AlertStorage {
    /// Alerts by id
    pub alerts: HashMap<String, Alert>,
    /// Alert ids, newest first
    pub history: VecDeque<String>,
    /// Alert statistics
    pub stats: AlertStats,
}

/// Metric a rule condition inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Uptime,
    ResponseTime,
    ErrorRate,
    ConsecutiveFailures,
    /// Any metric name this build does not know; never matches
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MetricKind::Uptime => "uptime",
            MetricKind::ResponseTime => "response_time",
            MetricKind::ErrorRate => "error_rate",
            MetricKind::ConsecutiveFailures => "consecutive_failures",
            MetricKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Comparison operators for alert rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    Gt,
    Lt,
    Eq,
    Ne,
    Gte,
    Lte,
}

impl ComparisonOperator {
    /// Compare `value` against `threshold`. Non-finite inputs never match.
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        if !value.is_finite() || !threshold.is_finite() {
            return false;
        }
        match self {
            ComparisonOperator::Gt => value > threshold,
            ComparisonOperator::Lt => value < threshold,
            ComparisonOperator::Gte => value >= threshold,
            ComparisonOperator::Lte => value <= threshold,
            ComparisonOperator::Eq => (value - threshold).abs() < f64::EPSILON,
            ComparisonOperator::Ne => (value - threshold).abs() >= f64::EPSILON,
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Lte => "lte",
        };
        f.write_str(op)
    }
}

/// A single threshold check inside a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    pub metric: MetricKind,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    /// How long the comparison must hold before the condition matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl AlertCondition {
    pub fn new(metric: MetricKind, operator: ComparisonOperator, threshold: f64) -> Self {
        Self {
            metric,
            operator,
            threshold,
            duration_ms: None,
        }
    }

    pub fn held_for(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}

/// How the conditions of a rule combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Fire when any condition matches
    #[default]
    Any,
    /// Fire only when every condition matches
    All,
}

/// Alert rule for automated alerting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Rule ID
    pub id: String,
    /// Rule name
    pub name: String,
    /// Rule description
    #[serde(default)]
    pub description: String,
    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Threshold conditions
    pub conditions: Vec<AlertCondition>,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Notification channels for this rule
    #[serde(default)]
    pub channels: Vec<String>,
    /// Minimum time between two firings for the same service
    #[serde(default)]
    pub cooldown_ms: u64,
    /// Resolve open alerts of this rule once no condition matches
    #[serde(default)]
    pub auto_resolve: bool,
}

fn default_true() -> bool {
    true
}

impl AlertRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: AlertSeverity,
        conditions: Vec<AlertCondition>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            conditions,
            match_mode: MatchMode::Any,
            severity,
            channels: Vec::new(),
            cooldown_ms: 0,
            auto_resolve: false,
        }
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn auto_resolve(mut self, auto_resolve: bool) -> Self {
        self.auto_resolve = auto_resolve;
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Re-notification policy for alerts left open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRule {
    /// Severity the policy applies to
    pub severity: AlertSeverity,
    /// Delay before the first escalation, and between escalations
    pub escalate_after_ms: u64,
    /// Channels notified on escalation
    pub escalate_to: Vec<String>,
    /// Upper bound on escalations per alert
    #[serde(default = "default_max_escalations")]
    pub max_escalations: u32,
}

fn default_max_escalations() -> u32 {
    1
}

impl EscalationRule {
    pub fn new<I, S>(severity: AlertSeverity, escalate_after: Duration, escalate_to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            severity,
            escalate_after_ms: escalate_after.as_millis() as u64,
            escalate_to: escalate_to.into_iter().map(Into::into).collect(),
            max_escalations: default_max_escalations(),
        }
    }

    pub fn with_max_escalations(mut self, max: u32) -> Self {
        self.max_escalations = max;
        self
    }

    pub fn escalate_after(&self) -> Duration {
        Duration::from_millis(self.escalate_after_ms)
    }
}

/// Query over stored alerts
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub service: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub alert_type: Option<AlertType>,
    pub acknowledged: Option<bool>,
    pub resolved: Option<bool>,
    pub limit: Option<usize>,
}

impl AlertFilter {
    pub fn service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            ..Default::default()
        }
    }

    pub fn unresolved() -> Self {
        Self {
            resolved: Some(false),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, alert_type: AlertType) -> Self {
        self.alert_type = Some(alert_type);
        self
    }

    pub fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.service
            .as_deref()
            .is_none_or(|s| alert.service.as_deref() == Some(s))
            && self.severity.is_none_or(|s| alert.severity == s)
            && self.alert_type.is_none_or(|t| alert.alert_type == t)
            && self.acknowledged.is_none_or(|a| alert.acknowledged == a)
            && self.resolved.is_none_or(|r| alert.resolved == r)
    }
}

/// Alert statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct AlertStats {
    /// Total alerts created
    pub total_alerts: u64,
    /// Candidates dropped by duplicate suppression
    pub suppressed_alerts: u64,
    /// Escalated alerts created
    pub escalated_alerts: u64,
    pub acknowledged_alerts: u64,
    pub resolved_alerts: u64,
    /// Alerts by severity
    pub alerts_by_severity: HashMap<String, u64>,
    /// Alerts by type
    pub alerts_by_type: HashMap<String, u64>,
    /// Alerts by service
    pub alerts_by_service: HashMap<String, u64>,
    /// Failed notifications
    pub failed_notifications: u64,
    /// Last alert timestamp
    pub last_alert: Option<chrono::DateTime<chrono::Utc>>,
}

impl AlertStats {
    pub(super) fn record(&mut self, alert: &Alert) {
        self.total_alerts += 1;
        *self
            .alerts_by_severity
            .entry(alert.severity.to_string())
            .or_insert(0) += 1;
        *self
            .alerts_by_type
            .entry(alert.alert_type.to_string())
            .or_insert(0) += 1;
        if let Some(service) = &alert.service {
            *self.alerts_by_service.entry(service.clone()).or_insert(0) += 1;
        }
        self.last_alert = Some(alert.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_operators() {
        assert!(ComparisonOperator::Gt.compare(6.0, 5.0));
        assert!(!ComparisonOperator::Gt.compare(5.0, 5.0));
        assert!(ComparisonOperator::Gte.compare(5.0, 5.0));
        assert!(ComparisonOperator::Lt.compare(94.0, 95.0));
        assert!(ComparisonOperator::Lte.compare(95.0, 95.0));
        assert!(ComparisonOperator::Eq.compare(0.0, 0.0));
        assert!(ComparisonOperator::Ne.compare(1.0, 0.0));
    }

    #[test]
    fn test_non_finite_values_never_match() {
        for op in [
            ComparisonOperator::Gt,
            ComparisonOperator::Lt,
            ComparisonOperator::Eq,
            ComparisonOperator::Ne,
            ComparisonOperator::Gte,
            ComparisonOperator::Lte,
        ] {
            assert!(!op.compare(f64::NAN, 1.0));
            assert!(!op.compare(1.0, f64::INFINITY));
        }
    }

    #[test]
    fn test_rule_from_yaml() {
        let yaml = r#"
id: high-error-rate
name: High error rate
conditions:
  - metric: error_rate
    operator: gt
    threshold: 5
  - metric: p99_latency
    operator: gt
    threshold: 100
    duration_ms: 60000
severity: high
channels: [console, browser]
cooldown_ms: 300000
"#;
        let rule: AlertRule = serde_yaml::from_str(yaml).unwrap();
        assert!(rule.enabled);
        assert!(!rule.auto_resolve);
        assert_eq!(rule.match_mode, MatchMode::Any);
        assert_eq!(rule.conditions[0].metric, MetricKind::ErrorRate);
        assert_eq!(rule.conditions[1].metric, MetricKind::Unknown);
        assert_eq!(rule.conditions[1].duration(), Some(Duration::from_secs(60)));
        assert_eq!(rule.cooldown(), Duration::from_secs(300));
        assert_eq!(rule.channels, vec!["console", "browser"]);
    }

    #[test]
    fn test_escalation_rule_defaults() {
        let rule: EscalationRule = serde_yaml::from_str(
            "severity: critical\nescalate_after_ms: 5000\nescalate_to: [webhook]\n",
        )
        .unwrap();
        assert_eq!(rule.max_escalations, 1);
        assert_eq!(rule.escalate_after(), Duration::from_secs(5));
    }

    #[test]
    fn test_filter_matches() {
        let alert = Alert::new(AlertType::ErrorRate, AlertSeverity::High, "t", "m").with_service("gs");

        assert!(AlertFilter::default().matches(&alert));
        assert!(AlertFilter::service("gs").matches(&alert));
        assert!(!AlertFilter::service("ac").matches(&alert));
        assert!(AlertFilter::unresolved().matches(&alert));
        assert!(
            !AlertFilter::default()
                .with_severity(AlertSeverity::Critical)
                .matches(&alert)
        );
        assert!(
            AlertFilter::service("gs")
                .with_type(AlertType::ErrorRate)
                .matches(&alert)
        );
    }

    #[test]
    fn test_stats_record() {
        let mut stats = AlertStats::default();
        let alert = Alert::new(AlertType::Uptime, AlertSeverity::Medium, "t", "m").with_service("ac");
        stats.record(&alert);
        stats.record(&alert);

        assert_eq!(stats.total_alerts, 2);
        assert_eq!(stats.alerts_by_severity.get("MEDIUM"), Some(&2));
        assert_eq!(stats.alerts_by_type.get("uptime"), Some(&2));
        assert_eq!(stats.alerts_by_service.get("ac"), Some(&2));
        assert!(stats.last_alert.is_some());
    }
}
