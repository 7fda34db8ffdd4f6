//! Service health monitoring and alerting
//!
//! Health probes feed rolling histories, histories feed metrics, metrics
//! feed alert rules, and alerts flow through the lifecycle manager to the
//! notification channels.

// Public submodules
pub mod alerts;
pub mod health;
pub mod metrics;
pub mod registry;

// Internal submodules
mod background;
mod bounded;
mod scheduler;
mod system;
mod types;

// Re-export public types
pub use bounded::{HEALTH_HISTORY_CAPACITY, MAX_ALERT_HISTORY};
pub use registry::{ServiceDescriptor, ServiceRegistry};
pub use scheduler::DeferredTasks;
pub use system::{MonitoringSystem, StatusReport};
pub use types::{
    Alert, AlertMetadata, AlertSeverity, AlertType, EscalationMetadata, ServiceDownMetadata,
    ThresholdMetadata,
};
