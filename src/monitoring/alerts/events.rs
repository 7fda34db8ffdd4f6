//! In-process alert events for UI subscribers

use crate::monitoring::types::Alert;
use serde::Serialize;
use tokio::sync::broadcast;

/// Name of the event carrying a delivered alert
pub const ALERT_EVENT: &str = "alert";

/// Alert delivered through the browser channel
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub name: &'static str,
    pub alert: Alert,
    /// Whether the UI should play the alert sound
    pub play_sound: bool,
}

/// Typed broadcast bus replacing callback registries.
///
/// Dropping a receiver unsubscribes it; slow receivers lose the oldest
/// events once the buffer is full.
#[derive(Debug, Clone)]
pub struct AlertEventBus {
    sender: broadcast::Sender<AlertEvent>,
}

impl AlertEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; returns how many subscribers received it
    pub fn publish(&self, alert: Alert, play_sound: bool) -> usize {
        let event = AlertEvent {
            name: ALERT_EVENT,
            alert,
            play_sound,
        };
        // No subscribers is not an error: the UI may not be attached
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AlertEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
