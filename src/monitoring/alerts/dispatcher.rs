//! Fan-out of alerts to notification channels

use super::channels::{ChannelConfig, NotificationChannel, build_channel};
use super::events::AlertEventBus;
use crate::monitoring::types::Alert;
use crate::utils::error::{MonitorError, Result};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct ChannelEntry {
    config: ChannelConfig,
    channel: Arc<dyn NotificationChannel>,
}

/// Outcome of delivering one alert to a single channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Channel disabled or filtered out by severity
    Skipped,
}

/// Per-channel outcome of a fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Routes alerts to configured channels
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    channels: Arc<RwLock<HashMap<String, ChannelEntry>>>,
    events: AlertEventBus,
    client: reqwest::Client,
}

impl NotificationDispatcher {
    pub fn new(configs: Vec<ChannelConfig>, events: AlertEventBus) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("govwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;

        let mut channels = HashMap::with_capacity(configs.len());
        for config in configs {
            if channels.contains_key(&config.id) {
                return Err(MonitorError::validation(format!(
                    "Duplicate notification channel id: {}",
                    config.id
                )));
            }
            let channel = build_channel(&config, &client, &events);
            channels.insert(config.id.clone(), ChannelEntry { config, channel });
        }

        Ok(Self {
            channels: Arc::new(RwLock::new(channels)),
            events,
            client,
        })
    }

    /// Event bus fed by browser channels
    pub fn events(&self) -> &AlertEventBus {
        &self.events
    }

    /// Add or replace a channel
    pub fn update_channel(&self, config: ChannelConfig) {
        debug!(channel = %config.id, kind = ?config.kind(), "Updating notification channel");
        let channel = build_channel(&config, &self.client, &self.events);
        self.channels
            .write()
            .insert(config.id.clone(), ChannelEntry { config, channel });
    }

    pub fn set_channel_enabled(&self, channel_id: &str, enabled: bool) -> Result<()> {
        let mut channels = self.channels.write();
        let entry = channels.get_mut(channel_id).ok_or_else(|| {
            MonitorError::not_found(format!("Notification channel {}", channel_id))
        })?;
        entry.config.enabled = enabled;
        Ok(())
    }

    pub fn channel(&self, channel_id: &str) -> Option<ChannelConfig> {
        self.channels
            .read()
            .get(channel_id)
            .map(|entry| entry.config.clone())
    }

    /// Configured channels, sorted by id
    pub fn channels(&self) -> Vec<ChannelConfig> {
        let mut configs: Vec<_> = self
            .channels
            .read()
            .values()
            .map(|entry| entry.config.clone())
            .collect();
        configs.sort_by(|a, b| a.id.cmp(&b.id));
        configs
    }

    /// Deliver `alert` to one channel if it is enabled and accepts the severity
    pub async fn send(&self, alert: &Alert, channel_id: &str) -> Result<Delivery> {
        // Clone the entry out so no lock is held across the send
        let entry = self.channels.read().get(channel_id).cloned().ok_or_else(|| {
            MonitorError::not_found(format!("Notification channel {}", channel_id))
        })?;

        if !entry.config.enabled || !entry.channel.supports_severity(alert.severity) {
            return Ok(Delivery::Skipped);
        }

        entry.channel.send(alert).await?;
        debug!(
            alert_id = %alert.id,
            channel = entry.channel.name(),
            kind = ?entry.channel.kind(),
            "Alert sent"
        );
        Ok(Delivery::Delivered)
    }

    /// Deliver `alert` to the channels it is routed to
    pub async fn dispatch(&self, alert: &Alert) -> DeliveryReport {
        self.dispatch_to(alert, &alert.channels).await
    }

    /// Deliver `alert` to `channel_ids` concurrently; failures are isolated per channel
    pub async fn dispatch_to(&self, alert: &Alert, channel_ids: &[String]) -> DeliveryReport {
        let outcomes = join_all(channel_ids.iter().map(|id| async move {
            (id.clone(), self.send(alert, id).await)
        }))
        .await;

        let mut report = DeliveryReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(Delivery::Delivered) => report.delivered.push(id),
                Ok(Delivery::Skipped) => report.skipped.push(id),
                Err(e) => {
                    warn!(alert_id = %alert.id, channel = %id, "Failed to send alert: {}", e);
                    report.failed.push(id);
                }
            }
        }
        report
    }
}
