//! # govwatch
//!
//! Health polling and alerting for the governance service mesh.
//!
//! Each monitored service is probed over HTTP on an interval. Results are
//! kept in a bounded rolling history, aggregated into uptime, latency and
//! error-rate metrics, and evaluated against threshold rules. Alerts that
//! survive duplicate suppression are stored, delivered to notification
//! channels (console, in-process browser events, webhooks) and escalated
//! when nobody acknowledges them in time.
//!
//! ```rust,no_run
//! use govwatch::{Config, MonitoringSystem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/govwatch.yaml").await?;
//!     let system = MonitoringSystem::new(&config)?;
//!     let mut alerts = system.subscribe();
//!
//!     system.start().await?;
//!     while let Ok(event) = alerts.recv().await {
//!         println!("{}: {}", event.alert.severity, event.alert.title);
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod monitoring;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use monitoring::{
    Alert, AlertSeverity, AlertType, MonitoringSystem, ServiceDescriptor, ServiceRegistry,
    StatusReport,
};
pub use utils::error::{MonitorError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
