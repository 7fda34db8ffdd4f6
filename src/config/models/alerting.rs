//! Alerting configuration

use super::*;
use crate::monitoring::AlertSeverity;
use crate::monitoring::alerts::{
    AlertCondition, AlertRule, ChannelConfig, ChannelSettings, ComparisonOperator,
    EscalationRule, MetricKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Id of the webhook channel added from `ALERT_WEBHOOK_URL`
pub const WEBHOOK_CHANNEL_ID: &str = "webhook";

/// Alert lifecycle, rules, channels and escalation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Seconds during which a repeated (type, service) alert is suppressed
    #[serde(default = "default_duplicate_window_secs")]
    pub duplicate_window_secs: u64,
    /// Days a resolved alert is kept
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Maximum alerts kept in history
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Capacity of the in-process alert event buffer
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    #[serde(default = "default_rules")]
    pub rules: Vec<AlertRule>,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
    #[serde(default = "default_escalation_rules")]
    pub escalation: Vec<EscalationRule>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            duplicate_window_secs: default_duplicate_window_secs(),
            retention_days: default_retention_days(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_history: default_max_history(),
            event_buffer: default_event_buffer(),
            rules: default_rules(),
            channels: default_channels(),
            escalation: default_escalation_rules(),
        }
    }
}

impl AlertingConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_secs(self.duplicate_window_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Register a webhook channel and route every rule to it
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.channels.retain(|c| c.id != WEBHOOK_CHANNEL_ID);
        self.channels.push(
            ChannelConfig::new(
                WEBHOOK_CHANNEL_ID,
                ChannelSettings::Webhook {
                    url: url.into(),
                    headers: Default::default(),
                },
            )
            .with_severities(&[AlertSeverity::Critical, AlertSeverity::High]),
        );
        for rule in &mut self.rules {
            if !rule.channels.iter().any(|c| c == WEBHOOK_CHANNEL_ID) {
                rule.channels.push(WEBHOOK_CHANNEL_ID.to_string());
            }
        }
        self
    }
}

const DEFAULT_CHANNELS: [&str; 2] = ["console", "browser"];

pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(
            "high-response-time",
            "High Response Time",
            AlertSeverity::Medium,
            vec![AlertCondition::new(
                MetricKind::ResponseTime,
                ComparisonOperator::Gt,
                2000.0,
            )],
        )
        .with_description("Average response time above 2 seconds")
        .with_channels(DEFAULT_CHANNELS)
        .with_cooldown(Duration::from_secs(300))
        .auto_resolve(true),
        AlertRule::new(
            "high-error-rate",
            "High Error Rate",
            AlertSeverity::High,
            vec![AlertCondition::new(
                MetricKind::ErrorRate,
                ComparisonOperator::Gt,
                5.0,
            )],
        )
        .with_description("More than 5% of recent health checks failed")
        .with_channels(DEFAULT_CHANNELS)
        .auto_resolve(true),
        AlertRule::new(
            "low-uptime",
            "Low Uptime",
            AlertSeverity::Medium,
            vec![AlertCondition::new(
                MetricKind::Uptime,
                ComparisonOperator::Lt,
                95.0,
            )],
        )
        .with_description("Healthy share of recent checks below 95%")
        .with_channels(DEFAULT_CHANNELS)
        .with_cooldown(Duration::from_secs(600)),
        AlertRule::new(
            "service-down",
            "Service Down",
            AlertSeverity::Critical,
            vec![AlertCondition::new(
                MetricKind::ConsecutiveFailures,
                ComparisonOperator::Gte,
                3.0,
            )],
        )
        .with_description("Three or more consecutive failed health checks")
        .with_channels(DEFAULT_CHANNELS)
        .auto_resolve(true),
    ]
}

pub fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig::new("console", ChannelSettings::Console { log_level: None }),
        ChannelConfig::new("browser", ChannelSettings::Browser { sound: true }),
    ]
}

pub fn default_escalation_rules() -> Vec<EscalationRule> {
    vec![
        EscalationRule::new(
            AlertSeverity::Critical,
            Duration::from_secs(300),
            DEFAULT_CHANNELS,
        )
        .with_max_escalations(3),
        EscalationRule::new(AlertSeverity::High, Duration::from_secs(900), ["console"]),
    ]
}
