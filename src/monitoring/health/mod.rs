//! Health checking system
//!
//! Probes every registered service over HTTP and keeps a bounded rolling
//! history per service.

mod checker;
mod components;
mod types;

#[cfg(test)]
mod tests;

// Re-export public types
pub use checker::HealthPoller;
pub use types::{
    HealthCheckResult, HealthDetails, HealthSummary, ServiceHistory, ServiceStatus,
};
