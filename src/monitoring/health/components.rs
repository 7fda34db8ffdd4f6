//! Single-service probe and outcome classification

use std::error::Error;
use std::io;
use std::time::Instant;

use super::checker::HealthPoller;
use super::types::{HealthCheckResult, HealthDetails, ServiceStatus};
use crate::monitoring::registry::ServiceDescriptor;
use tracing::debug;

impl HealthPoller {
    /// Issue one bounded-time GET against the service's health endpoint
    pub(super) async fn probe(&self, service: &ServiceDescriptor) -> HealthCheckResult {
        let timeout = service.timeout();
        let start_time = Instant::now();

        let outcome = self
            .client
            .get(service.health_url())
            .timeout(timeout)
            .send()
            .await;

        let result = match outcome {
            Ok(response) => {
                let status = response.status();
                if status == reqwest::StatusCode::OK {
                    // Bodies that are not JSON are accepted without details
                    let details = response.json::<HealthDetails>().await.ok();
                    let elapsed = start_time.elapsed().min(timeout);
                    let result = HealthCheckResult::new(
                        &service.id,
                        ServiceStatus::Healthy,
                        elapsed.as_millis() as u64,
                    );
                    match details {
                        Some(details) => result.with_details(details),
                        None => result,
                    }
                } else {
                    let elapsed = start_time.elapsed().min(timeout);
                    let status_kind = classify_status(status);
                    HealthCheckResult::new(&service.id, status_kind, elapsed.as_millis() as u64)
                        .with_error(describe_status(status))
                }
            }
            Err(e) => {
                let elapsed = start_time.elapsed().min(timeout);
                HealthCheckResult::new(
                    &service.id,
                    ServiceStatus::Unhealthy,
                    elapsed.as_millis() as u64,
                )
                .with_error(classify_error(&e))
            }
        };

        debug!(
            service = %service.id,
            status = %result.status,
            response_time_ms = result.response_time_ms,
            "Health probe finished"
        );
        result
    }
}

/// Server errors mean the service is down; any other non-200 answer is degraded
pub(super) fn classify_status(status: reqwest::StatusCode) -> ServiceStatus {
    if status == reqwest::StatusCode::OK {
        ServiceStatus::Healthy
    } else if status.is_server_error() {
        ServiceStatus::Unhealthy
    } else {
        ServiceStatus::Degraded
    }
}

pub(super) fn describe_status(status: reqwest::StatusCode) -> String {
    if status.is_server_error() {
        format!("server error: {}", status.as_u16())
    } else {
        format!("unexpected status: {}", status.as_u16())
    }
}

/// Map a transport failure to a short, stable error message
pub(super) fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        classify_connect_error(error.source())
            .unwrap_or_else(|| error.to_string())
    } else {
        error.to_string()
    }
}

/// Walk the cause chain of a connect failure.
///
/// `is_connect` also covers name resolution, which the connector reports as
/// a `dns error` cause ahead of the underlying I/O error.
pub(super) fn classify_connect_error(mut source: Option<&(dyn Error + 'static)>) -> Option<String> {
    while let Some(cause) = source {
        if cause.to_string().starts_with("dns error") {
            return Some("dns failure".to_string());
        }
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            return Some(match io.kind() {
                io::ErrorKind::ConnectionRefused => "connection refused".to_string(),
                _ => format!("connect error: {}", io),
            });
        }
        source = cause.source();
    }
    None
}
