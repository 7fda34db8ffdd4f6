//! Notification channel implementations

use super::events::AlertEventBus;
use crate::monitoring::types::{Alert, AlertSeverity};
use crate::utils::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Level, debug, error, info, warn};

/// Source tag of webhook payloads
pub const WEBHOOK_SOURCE: &str = "alerting-system";

/// Delivery sink kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Console,
    Browser,
    Email,
    Slack,
    Webhook,
}

/// Type-specific channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelSettings {
    Console {
        /// Fixed log level instead of one derived from severity
        #[serde(default)]
        log_level: Option<String>,
    },
    Browser {
        /// Play a sound for critical alerts
        #[serde(default)]
        sound: bool,
    },
    Email {
        #[serde(default)]
        recipients: Vec<String>,
    },
    Slack {
        #[serde(default)]
        webhook_url: Option<String>,
        #[serde(default)]
        channel: Option<String>,
    },
    Webhook {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl ChannelSettings {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelSettings::Console { .. } => ChannelKind::Console,
            ChannelSettings::Browser { .. } => ChannelKind::Browser,
            ChannelSettings::Email { .. } => ChannelKind::Email,
            ChannelSettings::Slack { .. } => ChannelKind::Slack,
            ChannelSettings::Webhook { .. } => ChannelKind::Webhook,
        }
    }
}

/// Delivery sink configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Severities this channel receives
    #[serde(default = "all_severities")]
    pub severity_filter: Vec<AlertSeverity>,
    #[serde(flatten)]
    pub settings: ChannelSettings,
}

fn default_true() -> bool {
    true
}

fn all_severities() -> Vec<AlertSeverity> {
    AlertSeverity::all().to_vec()
}

impl ChannelConfig {
    pub fn new(id: impl Into<String>, settings: ChannelSettings) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            severity_filter: all_severities(),
            settings,
        }
    }

    pub fn with_severities(mut self, severities: &[AlertSeverity]) -> Self {
        self.severity_filter = severities.to_vec();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn kind(&self) -> ChannelKind {
        self.settings.kind()
    }
}

/// Notification channel trait
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    /// Send a notification
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Channel id
    fn name(&self) -> &str;

    fn kind(&self) -> ChannelKind;

    /// Check if channel supports severity level
    fn supports_severity(&self, severity: AlertSeverity) -> bool;
}

/// Logs alerts through `tracing`
#[derive(Debug)]
pub struct ConsoleChannel {
    id: String,
    severity_filter: Vec<AlertSeverity>,
    level: Option<Level>,
}

impl ConsoleChannel {
    pub fn new(id: impl Into<String>, severity_filter: Vec<AlertSeverity>, level: Option<Level>) -> Self {
        Self {
            id: id.into(),
            severity_filter,
            level,
        }
    }

    /// Log level used for an alert of `severity`
    pub fn level_for(&self, severity: AlertSeverity) -> Level {
        self.level.unwrap_or(match severity {
            AlertSeverity::Critical | AlertSeverity::High => Level::ERROR,
            AlertSeverity::Medium => Level::WARN,
            AlertSeverity::Low | AlertSeverity::Info => Level::INFO,
        })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let service = alert.service.as_deref().unwrap_or("-");
        macro_rules! log_alert {
            ($macro:ident) => {
                $macro!(
                    alert_id = %alert.id,
                    severity = %alert.severity,
                    alert_type = %alert.alert_type,
                    service,
                    "[ALERT] {}: {}",
                    alert.title,
                    alert.message
                )
            };
        }

        match self.level_for(alert.severity) {
            Level::ERROR => log_alert!(error),
            Level::WARN => log_alert!(warn),
            Level::INFO => log_alert!(info),
            _ => log_alert!(debug),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Console
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        self.severity_filter.contains(&severity)
    }
}

/// Publishes alerts as in-process `alert` events
#[derive(Debug)]
pub struct BrowserChannel {
    id: String,
    severity_filter: Vec<AlertSeverity>,
    sound: bool,
    events: AlertEventBus,
}

impl BrowserChannel {
    pub fn new(
        id: impl Into<String>,
        severity_filter: Vec<AlertSeverity>,
        sound: bool,
        events: AlertEventBus,
    ) -> Self {
        Self {
            id: id.into(),
            severity_filter,
            sound,
            events,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for BrowserChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let play_sound = self.sound && alert.severity == AlertSeverity::Critical;
        let receivers = self.events.publish(alert.clone(), play_sound);
        debug!(alert_id = %alert.id, receivers, "Published alert event");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Browser
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        self.severity_filter.contains(&severity)
    }
}

/// Posts alerts as JSON to an HTTP endpoint
#[derive(Debug)]
pub struct WebhookChannel {
    id: String,
    severity_filter: Vec<AlertSeverity>,
    url: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(
        id: impl Into<String>,
        severity_filter: Vec<AlertSeverity>,
        url: impl Into<String>,
        headers: HashMap<String, String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            id: id.into(),
            severity_filter,
            url: url.into(),
            headers,
            client,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let payload = serde_json::json!({
            "alert": alert,
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "source": WEBHOOK_SOURCE,
        });

        let mut request = self.client.post(&self.url).json(&payload);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MonitorError::timeout(format!("Webhook {} did not answer in time", self.url))
            } else {
                MonitorError::notification(format!("Failed to send webhook notification: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(MonitorError::notification(format!(
                "Webhook returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Webhook
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        self.severity_filter.contains(&severity)
    }
}

/// Email notification channel; delivery is not implemented, the intent is logged
#[derive(Debug)]
pub struct EmailChannel {
    id: String,
    severity_filter: Vec<AlertSeverity>,
    recipients: Vec<String>,
}

impl EmailChannel {
    pub fn new(id: impl Into<String>, severity_filter: Vec<AlertSeverity>, recipients: Vec<String>) -> Self {
        Self {
            id: id.into(),
            severity_filter,
            recipients,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        info!(
            alert_id = %alert.id,
            recipients = ?self.recipients,
            "Email notification not implemented, would send: {}",
            alert.title
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        self.severity_filter.contains(&severity)
    }
}

/// Slack notification channel; delivery is not implemented, the intent is logged
#[derive(Debug)]
pub struct SlackChannel {
    id: String,
    severity_filter: Vec<AlertSeverity>,
    channel: Option<String>,
}

impl SlackChannel {
    pub fn new(id: impl Into<String>, severity_filter: Vec<AlertSeverity>, channel: Option<String>) -> Self {
        Self {
            id: id.into(),
            severity_filter,
            channel,
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SlackChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        info!(
            alert_id = %alert.id,
            channel = self.channel.as_deref().unwrap_or("default"),
            "Slack notification not implemented, would post: {}",
            alert.title
        );
        Ok(())
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        self.severity_filter.contains(&severity)
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Instantiate the channel described by `config`
pub fn build_channel(
    config: &ChannelConfig,
    client: &reqwest::Client,
    events: &AlertEventBus,
) -> Arc<dyn NotificationChannel> {
    let filter = config.severity_filter.clone();
    match &config.settings {
        ChannelSettings::Console { log_level } => {
            let level = log_level.as_deref().and_then(parse_level);
            Arc::new(ConsoleChannel::new(&config.id, filter, level))
        }
        ChannelSettings::Browser { sound } => Arc::new(BrowserChannel::new(
            &config.id,
            filter,
            *sound,
            events.clone(),
        )),
        ChannelSettings::Email { recipients } => {
            Arc::new(EmailChannel::new(&config.id, filter, recipients.clone()))
        }
        ChannelSettings::Slack { channel, .. } => {
            Arc::new(SlackChannel::new(&config.id, filter, channel.clone()))
        }
        ChannelSettings::Webhook { url, headers } => Arc::new(WebhookChannel::new(
            &config.id,
            filter,
            url,
            headers.clone(),
            client.clone(),
        )),
    }
}
