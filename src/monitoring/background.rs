//! Background task implementations for MonitoringSystem

use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::system::MonitoringSystem;

impl MonitoringSystem {
    /// Start the polling and cleanup loops
    pub(super) fn start_background_tasks(&self) {
        let mut tasks = self.tasks.lock();

        // Health check task
        let monitoring = self.clone();
        tasks.push(tokio::spawn(async move {
            let mut interval = polling_interval(monitoring.poll_interval);
            loop {
                interval.tick().await;
                if !monitoring.is_active() {
                    break;
                }
                if let Some(results) = monitoring.run_health_checks().await {
                    debug!(services = results.len(), "Health check round complete");
                }
            }
        }));

        // Alert cleanup task
        let monitoring = self.clone();
        tasks.push(tokio::spawn(async move {
            let mut interval = polling_interval(monitoring.cleanup_interval);
            // The first tick completes immediately; nothing is stale yet
            interval.tick().await;
            loop {
                interval.tick().await;
                if !monitoring.is_active() {
                    break;
                }
                monitoring.alerts.cleanup();
            }
        }));
    }
}

fn polling_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
