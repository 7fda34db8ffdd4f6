//! Test fixtures and data factories
//!
//! All factories create real objects, not mocks.

use govwatch::config::{AlertingConfig, Config};
use govwatch::monitoring::alerts::{
    AlertCondition, AlertRule, ChannelConfig, ChannelSettings, ComparisonOperator,
    EscalationRule, MetricKind,
};
use govwatch::{AlertSeverity, ServiceDescriptor};
use std::time::Duration;

/// Factory for pipeline configurations
pub struct ConfigFactory;

impl ConfigFactory {
    /// One critical service, no rules, no escalation
    pub fn single_service(id: &str, base_url: &str) -> Config {
        Self::with_services(vec![Self::service(id, base_url)])
    }

    pub fn with_services(services: Vec<ServiceDescriptor>) -> Config {
        Config {
            services,
            alerting: AlertingConfig {
                rules: Vec::new(),
                escalation: Vec::new(),
                channels: Self::channels(),
                ..AlertingConfig::default()
            },
            ..Config::default()
        }
    }

    pub fn service(id: &str, base_url: &str) -> ServiceDescriptor {
        ServiceDescriptor::new(id, format!("{} service", id), base_url)
            .critical(true)
            .with_timeout(Duration::from_secs(2))
    }

    /// Console and browser channels
    pub fn channels() -> Vec<ChannelConfig> {
        vec![
            ChannelConfig::new("console", ChannelSettings::Console { log_level: None }),
            ChannelConfig::new("browser", ChannelSettings::Browser { sound: true }),
        ]
    }

    pub fn webhook(url: &str) -> ChannelConfig {
        ChannelConfig::new(
            "webhook",
            ChannelSettings::Webhook {
                url: url.to_string(),
                headers: Default::default(),
            },
        )
    }
}

/// Factory for alert and escalation rules
pub struct RuleFactory;

impl RuleFactory {
    /// `error_rate gt 5`, high, routed to console and browser
    pub fn error_rate() -> AlertRule {
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
        .with_channels(["console", "browser"])
    }

    /// `consecutive_failures gte 1`, critical, routed to console
    pub fn service_down() -> AlertRule {
        AlertRule::new(
            "service-down",
            "Service Down",
            AlertSeverity::Critical,
            vec![AlertCondition::new(
                MetricKind::ConsecutiveFailures,
                ComparisonOperator::Gte,
                1.0,
            )],
        )
        .with_channels(["console"])
    }

    pub fn escalate_critical(after: Duration) -> EscalationRule {
        EscalationRule::new(AlertSeverity::Critical, after, ["console", "browser"])
    }
}
