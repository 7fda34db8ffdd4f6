//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use govwatch::config::Config;
    use govwatch::monitoring::alerts::ChannelKind;
    use govwatch::{MonitorError, MonitoringSystem};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let file = write_config("logging:\n  level: debug\n");
        let config = Config::from_file(file.path()).await.unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.services.len(), 7);
        assert_eq!(config.alerting.rules.len(), 4);
        assert_eq!(config.alerting.channels.len(), 2);

        let system = MonitoringSystem::new(&config).unwrap();
        assert_eq!(system.registry().len(), 7);
        assert!(system.registry().is_critical("auth"));
        assert!(!system.registry().is_critical("gs"));
    }

    #[tokio::test]
    async fn test_full_file_builds_system() {
        let file = write_config(
            r#"
services:
  - id: gs
    name: Governance Synthesis Service
    base_url: http://gs.internal:8004
  - id: pgc
    name: Policy Compliance Service
    base_url: http://pgc.internal:8005
    health_path: /api/health
    critical: true
alerting:
  channels:
    - id: ops
      type: webhook
      url: https://hooks.example.com/govwatch
      severity_filter: [critical]
    - id: console
      type: console
      log_level: warn
  rules:
    - id: pgc-slow
      name: PGC slow
      severity: medium
      channels: [console]
      cooldown_ms: 60000
      conditions:
        - metric: response_time
          operator: gte
          threshold: 1500
  escalation:
    - severity: critical
      escalate_after_ms: 60000
      escalate_to: [ops]
      max_escalations: 2
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();
        let system = MonitoringSystem::new(&config).unwrap();

        let channels = system.alerts().dispatcher().channels();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].kind(), ChannelKind::Webhook);
        assert_eq!(
            system.registry().get("pgc").unwrap().health_url(),
            "http://pgc.internal:8005/api/health"
        );
        assert_eq!(system.rules().rules().len(), 1);
        assert_eq!(system.alerts().escalation_rules()[0].max_escalations, 2);
    }

    #[tokio::test]
    async fn test_dangling_channel_reference_rejected() {
        let file = write_config(
            r#"
alerting:
  rules:
    - id: r1
      name: R1
      severity: high
      channels: [pager]
      conditions:
        - metric: error_rate
          operator: gt
          threshold: 5
"#,
        );

        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, MonitorError::Config(ref msg) if msg.contains("pager")));
    }

    #[tokio::test]
    async fn test_malformed_yaml_rejected() {
        let file = write_config("services: [this is not: a service\n");
        assert!(matches!(
            Config::from_file(file.path()).await,
            Err(MonitorError::Config(_))
        ));
    }
}
