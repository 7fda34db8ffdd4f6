//! Health checking tests

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::checker::HealthPoller;
use super::components::classify_connect_error;
use super::types::{HealthCheckResult, ServiceHistory, ServiceStatus};
use crate::monitoring::registry::{ServiceDescriptor, ServiceRegistry};
use crate::utils::error::MonitorError;

fn poller_for(services: Vec<ServiceDescriptor>) -> HealthPoller {
    let registry = Arc::new(ServiceRegistry::new(services).unwrap());
    HealthPoller::new(registry, 100).unwrap()
}

async fn mock_health(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_healthy_probe_captures_details() {
    let server = MockServer::start().await;
    mock_health(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "version": "2.1.0",
            "dependencies": {"database": "up"}
        })),
    )
    .await;

    let poller = poller_for(vec![ServiceDescriptor::new("ac", "Constitutional AI", server.uri())]);
    let result = poller.check_service_health("ac").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Healthy);
    assert!(result.error.is_none());
    let details = result.details.unwrap();
    assert_eq!(details.version.as_deref(), Some("2.1.0"));
    assert_eq!(details.dependencies.unwrap()["database"], "up");
}

#[tokio::test]
async fn test_healthy_probe_without_json_body() {
    let server = MockServer::start().await;
    mock_health(&server, ResponseTemplate::new(200).set_body_string("OK")).await;

    let poller = poller_for(vec![ServiceDescriptor::new("ec", "Event Coordination", server.uri())]);
    let result = poller.check_service_health("ec").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Healthy);
    assert!(result.details.is_none());
}

#[tokio::test]
async fn test_server_error_is_unhealthy() {
    let server = MockServer::start().await;
    mock_health(&server, ResponseTemplate::new(503)).await;

    let poller = poller_for(vec![ServiceDescriptor::new("ac", "Constitutional AI", server.uri())]);
    let result = poller.check_service_health("ac").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Unhealthy);
    assert_eq!(result.error.as_deref(), Some("server error: 503"));
}

#[tokio::test]
async fn test_client_error_is_degraded() {
    let server = MockServer::start().await;
    mock_health(&server, ResponseTemplate::new(404)).await;

    let poller = poller_for(vec![ServiceDescriptor::new("fv", "Formal Verification", server.uri())]);
    let result = poller.check_service_health("fv").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Degraded);
    assert_eq!(result.error.as_deref(), Some("unexpected status: 404"));
}

#[tokio::test]
async fn test_timeout_is_unhealthy_and_bounded() {
    let server = MockServer::start().await;
    mock_health(
        &server,
        ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
    )
    .await;

    let service = ServiceDescriptor::new("gs", "Governance Synthesis", server.uri())
        .with_timeout(Duration::from_millis(100));
    let poller = poller_for(vec![service]);
    let result = poller.check_service_health("gs").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Unhealthy);
    assert_eq!(result.error.as_deref(), Some("timeout"));
    assert!(result.response_time_ms <= 100);
}

#[tokio::test]
async fn test_connection_refused_is_unhealthy() {
    let service = ServiceDescriptor::new("pgc", "Policy Compliance", "http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(2));
    let poller = poller_for(vec![service]);
    let result = poller.check_service_health("pgc").await.unwrap();

    assert_eq!(result.status, ServiceStatus::Unhealthy);
    assert_eq!(result.error.as_deref(), Some("connection refused"));
}

/// Connector-style error: a message with an optional cause
#[derive(Debug)]
struct ConnectFailure {
    msg: &'static str,
    cause: std::io::Error,
}

impl std::fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.msg)
    }
}

impl std::error::Error for ConnectFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

#[test]
fn test_dns_failure_is_not_reported_as_refused() {
    let dns = ConnectFailure {
        msg: "dns error",
        cause: std::io::Error::other("failed to lookup address information"),
    };
    assert_eq!(classify_connect_error(Some(&dns)).as_deref(), Some("dns failure"));

    let refused = ConnectFailure {
        msg: "tcp connect error",
        cause: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
    };
    assert_eq!(
        classify_connect_error(Some(&refused)).as_deref(),
        Some("connection refused")
    );

    let unreachable = ConnectFailure {
        msg: "tcp connect error",
        cause: std::io::Error::new(std::io::ErrorKind::TimedOut, "host unreachable"),
    };
    assert_eq!(
        classify_connect_error(Some(&unreachable)).as_deref(),
        Some("connect error: host unreachable")
    );

    assert_eq!(classify_connect_error(None), None);
}

#[tokio::test]
async fn test_unknown_service_is_not_found() {
    let poller = poller_for(vec![]);
    let err = poller.check_service_health("nope").await.unwrap_err();
    assert!(matches!(err, MonitorError::NotFound(_)));
}

#[tokio::test]
async fn test_check_all_isolates_failures() {
    let up = MockServer::start().await;
    mock_health(&up, ResponseTemplate::new(200)).await;
    let slow = MockServer::start().await;
    mock_health(&slow, ResponseTemplate::new(200).set_delay(Duration::from_secs(2))).await;

    let poller = poller_for(vec![
        ServiceDescriptor::new("auth", "Auth", up.uri()),
        ServiceDescriptor::new("gs", "Governance Synthesis", slow.uri())
            .with_timeout(Duration::from_millis(100)),
        ServiceDescriptor::new("pgc", "Policy Compliance", "http://127.0.0.1:1"),
    ]);

    let results = poller.check_all_services().await;

    assert_eq!(results.len(), 3);
    assert_eq!(results["auth"].status, ServiceStatus::Healthy);
    assert_eq!(results["gs"].status, ServiceStatus::Unhealthy);
    assert_eq!(results["pgc"].status, ServiceStatus::Unhealthy);
    assert_eq!(poller.history("auth").len(), 1);
}

#[test]
fn test_history_is_bounded() {
    let mut history = ServiceHistory::new(100);
    for i in 0..150 {
        history.push(HealthCheckResult::new("ac", ServiceStatus::Healthy, i));
    }

    assert_eq!(history.len(), 100);
    assert_eq!(history.iter().next().unwrap().response_time_ms, 50);
    assert_eq!(history.latest().unwrap().response_time_ms, 149);
    assert_eq!(history.recent(20).count(), 20);
    assert_eq!(history.recent(20).next().unwrap().response_time_ms, 130);
}

#[test]
fn test_summary_overall_status() {
    let poller = poller_for(vec![
        ServiceDescriptor::new("auth", "Auth", "http://localhost:8000").critical(true),
        ServiceDescriptor::new("ec", "Event Coordination", "http://localhost:8006"),
    ]);

    assert_eq!(poller.summary().overall, ServiceStatus::Unknown);
    assert_eq!(poller.service_status("auth"), ServiceStatus::Unknown);

    poller.record(HealthCheckResult::new("auth", ServiceStatus::Healthy, 10));
    poller.record(HealthCheckResult::new("ec", ServiceStatus::Unhealthy, 10));
    let summary = poller.summary();
    assert_eq!(summary.overall, ServiceStatus::Degraded);
    assert_eq!(summary.unhealthy_services, 1);
    assert!(summary.last_check.is_some());

    poller.record(HealthCheckResult::new("auth", ServiceStatus::Unhealthy, 10));
    assert_eq!(poller.summary().overall, ServiceStatus::Unhealthy);
}
