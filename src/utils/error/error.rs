//! Error handling for the monitor
//!
//! This module defines all error types used throughout the pipeline.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for the monitor
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for the monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Alert errors
    #[error("Alert error: {0}")]
    Alert(String),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Monitoring errors
    #[error("Monitoring error: {0}")]
    Monitoring(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Helper functions for creating specific errors
impl MonitorError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn alert<S: Into<String>>(message: S) -> Self {
        Self::Alert(message.into())
    }

    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification(message.into())
    }

    pub fn monitoring<S: Into<String>>(message: S) -> Self {
        Self::Monitoring(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::not_found("alert abc");
        assert_eq!(err.to_string(), "Not found: alert abc");

        let err = MonitorError::config("missing services");
        assert_eq!(err.to_string(), "Configuration error: missing services");
    }

    #[test]
    fn test_yaml_error_conversion() {
        let parse: std::result::Result<serde_yaml::Value, _> = serde_yaml::from_str("a: [1, 2");
        let err: MonitorError = parse.unwrap_err().into();
        assert!(matches!(err, MonitorError::Yaml(_)));
    }
}
