//! Configuration data models

#![allow(missing_docs)]

pub mod alerting;
pub mod logging;
pub mod monitoring;
pub mod service;

// Re-export all configuration types
pub use alerting::*;
pub use logging::*;
pub use monitoring::*;
pub use service::*;

pub fn default_true() -> bool {
    true
}

/// Default polling interval in seconds
pub fn default_poll_interval_secs() -> u64 {
    30
}

pub fn default_history_capacity() -> usize {
    crate::monitoring::HEALTH_HISTORY_CAPACITY
}

/// Default duplicate suppression window in seconds
pub fn default_duplicate_window_secs() -> u64 {
    300 // 5 minutes
}

pub fn default_retention_days() -> u32 {
    7
}

pub fn default_cleanup_interval_secs() -> u64 {
    3600 // 1 hour
}

pub fn default_max_history() -> usize {
    crate::monitoring::MAX_ALERT_HISTORY
}

pub fn default_event_buffer() -> usize {
    256
}

pub fn default_log_level() -> String {
    "info".to_string()
}
