//! Escalation integration tests

#[cfg(test)]
mod tests {
    use crate::common::assertions::AlertAssertions;
    use crate::common::{ConfigFactory, RuleFactory, mock_health};
    use govwatch::monitoring::alerts::AlertFilter;
    use govwatch::{AlertSeverity, AlertType, MonitoringSystem};
    use std::time::Duration;

    async fn failing_system(escalate_after: Duration) -> (MonitoringSystem, wiremock::MockServer) {
        let server = mock_health(503).await;
        let mut config = ConfigFactory::single_service("pgc", &server.uri());
        config.alerting.rules = vec![RuleFactory::service_down()];
        config.alerting.escalation = vec![RuleFactory::escalate_critical(escalate_after)];
        (MonitoringSystem::new(&config).unwrap(), server)
    }

    fn escalations(system: &MonitoringSystem) -> Vec<govwatch::Alert> {
        system
            .alerts()
            .get_alerts(&AlertFilter::default().with_type(AlertType::Escalation))
    }

    #[tokio::test]
    async fn test_unacknowledged_alert_escalates() {
        let (system, _server) = failing_system(Duration::from_millis(200)).await;

        let created = system
            .process_result(&system.health().check_service_health("pgc").await.unwrap())
            .await;
        assert_eq!(created.len(), 1);
        let original = &created[0];
        original.assert_open();

        tokio::time::sleep(Duration::from_millis(500)).await;

        let escalated = escalations(&system);
        assert_eq!(escalated.len(), 1);
        let meta = escalated[0].assert_escalates(original);
        assert_eq!(meta.escalation_level, 1);
        assert_eq!(escalated[0].severity, AlertSeverity::Critical);
        assert_eq!(system.alerts().stats().escalated_alerts, 1);
    }

    #[tokio::test]
    async fn test_acknowledged_alert_does_not_escalate() {
        let (system, _server) = failing_system(Duration::from_millis(300)).await;

        let result = system.check_service_health("pgc").await.unwrap();
        assert!(!result.is_healthy());
        let original = system.alerts().active_alerts().remove(0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        system.alerts().acknowledge_alert(&original.id, "oncall").unwrap();
        assert_eq!(system.alerts().pending_escalations(&original.id), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(escalations(&system).is_empty());
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_escalations() {
        let (system, _server) = failing_system(Duration::from_millis(200)).await;

        system.check_service_health("pgc").await.unwrap();
        system.stop().await.unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(escalations(&system).is_empty());
    }
}
