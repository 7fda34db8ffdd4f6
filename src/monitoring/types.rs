//! Type definitions for alerts

use super::alerts::{ComparisonOperator, MetricKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity levels, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// The next severity level, saturating at `Critical`
    pub fn raised(self) -> Self {
        match self {
            AlertSeverity::Info => AlertSeverity::Low,
            AlertSeverity::Low => AlertSeverity::Medium,
            AlertSeverity::Medium => AlertSeverity::High,
            AlertSeverity::High | AlertSeverity::Critical => AlertSeverity::Critical,
        }
    }

    pub fn all() -> [AlertSeverity; 5] {
        [
            AlertSeverity::Info,
            AlertSeverity::Low,
            AlertSeverity::Medium,
            AlertSeverity::High,
            AlertSeverity::Critical,
        ]
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Info => write!(f, "INFO"),
            AlertSeverity::Low => write!(f, "LOW"),
            AlertSeverity::Medium => write!(f, "MEDIUM"),
            AlertSeverity::High => write!(f, "HIGH"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Kind of condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ServiceDown,
    ResponseTime,
    ErrorRate,
    Uptime,
    Escalation,
}

impl AlertType {
    /// Alert type raised by a rule condition on `metric`
    pub fn for_metric(metric: MetricKind) -> Self {
        match metric {
            MetricKind::ResponseTime => AlertType::ResponseTime,
            MetricKind::ErrorRate => AlertType::ErrorRate,
            MetricKind::Uptime => AlertType::Uptime,
            MetricKind::ConsecutiveFailures | MetricKind::Unknown => AlertType::ServiceDown,
        }
    }

    /// Remediation steps shown next to the alert
    pub fn suggested_actions(self) -> Vec<String> {
        let actions: &[&str] = match self {
            AlertType::ServiceDown => &[
                "Check service logs for crash or startup errors",
                "Verify network connectivity to the service host",
                "Restart the service if it does not recover",
            ],
            AlertType::ResponseTime => &[
                "Inspect recent deployments for performance regressions",
                "Check database and downstream dependency latency",
                "Scale the service if load has increased",
            ],
            AlertType::ErrorRate => &[
                "Review recent error logs for the service",
                "Check health of the service's dependencies",
                "Roll back the latest deployment if errors started after it",
            ],
            AlertType::Uptime => &[
                "Review the service's health history for flapping",
                "Check resource limits and restart counts",
            ],
            AlertType::Escalation => &[
                "Acknowledge the original alert to stop further escalation",
                "Page the on-call owner of the affected service",
            ],
        };
        actions.iter().map(|a| a.to_string()).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::ServiceDown => "service_down",
            AlertType::ResponseTime => "response_time",
            AlertType::ErrorRate => "error_rate",
            AlertType::Uptime => "uptime",
            AlertType::Escalation => "escalation",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold comparison that triggered an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdMetadata {
    pub rule_id: String,
    pub metric: MetricKind,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub value: f64,
}

/// Details of a service that stopped answering its health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDownMetadata {
    pub rule_id: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

/// Link from an escalated alert back to the alert it escalates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationMetadata {
    pub original_alert_id: String,
    pub original_type: AlertType,
    pub escalation_level: u32,
    pub max_escalations: u32,
}

/// Typed alert metadata, one variant per alert type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertMetadata {
    ResponseTime(ThresholdMetadata),
    ErrorRate(ThresholdMetadata),
    Uptime(ThresholdMetadata),
    ServiceDown(ServiceDownMetadata),
    Escalation(EscalationMetadata),
    Empty,
}

impl AlertMetadata {
    /// Id of the rule that produced the alert, if any
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            AlertMetadata::ResponseTime(m) | AlertMetadata::ErrorRate(m) | AlertMetadata::Uptime(m) => {
                Some(&m.rule_id)
            }
            AlertMetadata::ServiceDown(m) => Some(&m.rule_id),
            AlertMetadata::Escalation(_) | AlertMetadata::Empty => None,
        }
    }
}

/// A detected condition instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert ID
    pub id: String,
    /// Alert type
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Originating service
    pub service: Option<String>,
    /// Alert title
    pub title: String,
    /// Alert message
    pub message: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved: bool,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
    /// Channel ids the alert is routed to
    #[serde(default)]
    pub channels: Vec<String>,
    pub metadata: AlertMetadata,
    /// Suggested remediation actions
    #[serde(default)]
    pub actions: Vec<String>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            severity,
            service: None,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolution_note: None,
            channels: Vec::new(),
            metadata: AlertMetadata::Empty,
            actions: alert_type.suggested_actions(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_metadata(mut self, metadata: AlertMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Key used for duplicate suppression
    pub fn suppression_key(&self) -> String {
        format!(
            "{}:{}",
            self.alert_type,
            self.service.as_deref().unwrap_or("-")
        )
    }

    /// Whether the alert still needs attention
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.acknowledged && !self.resolved
    }
}
