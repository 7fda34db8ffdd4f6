//! End-to-end pipeline tests
//!
//! Poll mocked services, aggregate, evaluate rules and deliver alerts.

#[cfg(test)]
mod tests {
    use crate::assert_percentage;
    use crate::common::{ConfigFactory, RuleFactory, mock_health, mount_health};
    use govwatch::monitoring::alerts::AlertFilter;
    use govwatch::monitoring::health::ServiceStatus;
    use govwatch::{AlertSeverity, AlertType, MonitoringSystem};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Service `ac` answers 503 three times: one high error-rate alert on console and browser
    #[tokio::test]
    async fn test_failing_service_alerts_console_and_browser() {
        let server = mock_health(503).await;
        let mut config = ConfigFactory::single_service("ac", &server.uri());
        config.alerting.rules = vec![RuleFactory::error_rate()];

        let system = MonitoringSystem::new(&config).unwrap();
        let mut events = system.subscribe();

        for _ in 0..3 {
            system.run_health_checks().await.unwrap();
        }

        let metrics = system.service_metrics("ac");
        assert_percentage!(metrics.error_rate);
        assert_percentage!(metrics.uptime);
        assert_eq!(metrics.error_rate, 100.0);

        let alerts = system.alerts().get_alerts(&AlertFilter::service("ac"));
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.alert_type, AlertType::ErrorRate);
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.channels, vec!["console".to_string(), "browser".to_string()]);
        assert!(alert.message.contains("server error: 503"));

        let event = events.recv().await.unwrap();
        assert_eq!(event.alert.id, alert.id);
        assert!(!event.play_sound);

        assert_eq!(system.alerts().stats().suppressed_alerts, 2);
    }

    /// Failures inside the window collapse; one after the window opens a new alert
    #[tokio::test]
    async fn test_duplicate_window_collapses_repeated_failures() {
        let server = mock_health(500).await;
        let mut config = ConfigFactory::single_service("gs", &server.uri());
        config.alerting.rules = vec![RuleFactory::service_down()];
        config.alerting.duplicate_window_secs = 1;

        let system = MonitoringSystem::new(&config).unwrap();

        system.check_service_health("gs").await.unwrap();
        system.check_service_health("gs").await.unwrap();
        assert_eq!(system.alerts().get_alerts(&AlertFilter::service("gs")).len(), 1);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        system.check_service_health("gs").await.unwrap();

        let alerts = system.alerts().get_alerts(&AlertFilter::service("gs"));
        assert_eq!(alerts.len(), 2);
        assert_ne!(alerts[0].id, alerts[1].id);
    }

    /// One failing service never prevents results for the others
    #[tokio::test]
    async fn test_round_isolates_failures() {
        let healthy = mock_health(200).await;
        let degraded = mock_health(404).await;
        let config = ConfigFactory::with_services(vec![
            ConfigFactory::service("auth", &healthy.uri()),
            ConfigFactory::service("fv", &degraded.uri()),
            ConfigFactory::service("ec", "http://127.0.0.1:1"),
        ]);

        let system = MonitoringSystem::new(&config).unwrap();
        let results = system.run_health_checks().await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results["auth"].status, ServiceStatus::Healthy);
        assert_eq!(results["fv"].status, ServiceStatus::Degraded);
        assert_eq!(results["ec"].status, ServiceStatus::Unhealthy);
        assert_eq!(results["ec"].error.as_deref(), Some("connection refused"));

        // A critical service is down
        assert_eq!(system.health_summary().overall, ServiceStatus::Unhealthy);

        let fv = system.service_metrics("fv");
        assert_eq!(fv.uptime + fv.error_rate, 0.0);
    }

    /// Alerts reach a webhook as JSON
    #[tokio::test]
    async fn test_alert_delivered_to_webhook() {
        let service = mock_health(503).await;
        let hook = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alerts"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "source": "alerting-system",
                "alert": {"type": "error_rate", "service": "ac", "severity": "high"}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&hook)
            .await;

        let mut config = ConfigFactory::single_service("ac", &service.uri());
        config
            .alerting
            .channels
            .push(ConfigFactory::webhook(&format!("{}/alerts", hook.uri())));
        config.alerting.rules = vec![RuleFactory::error_rate().with_channels(["webhook"])];

        let system = MonitoringSystem::new(&config).unwrap();
        system.run_health_checks().await.unwrap();

        assert_eq!(system.alerts().stats().failed_notifications, 0);
    }

    /// Health details reported by the service are kept
    #[tokio::test]
    async fn test_health_details_recorded() {
        let server = MockServer::start().await;
        mount_health(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "version": "1.4.2",
                "dependencies": {"postgres": "up"}
            })),
            None,
        )
        .await;

        let system = MonitoringSystem::new(&ConfigFactory::single_service("integrity", &server.uri())).unwrap();
        let result = system.check_service_health("integrity").await.unwrap();

        let details = result.details.expect("details parsed");
        assert_eq!(details.version.as_deref(), Some("1.4.2"));
        assert_eq!(system.health().history("integrity").len(), 1);
    }
}
