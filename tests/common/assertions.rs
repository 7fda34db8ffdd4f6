//! Custom test assertions

use govwatch::monitoring::{AlertMetadata, EscalationMetadata};
use govwatch::{Alert, AlertType};

/// Assertions for alerts
pub trait AlertAssertions {
    /// Assert the alert escalates `original` and return its metadata
    fn assert_escalates(&self, original: &Alert) -> &EscalationMetadata;

    /// Assert the alert still needs attention
    fn assert_open(&self);
}

impl AlertAssertions for Alert {
    fn assert_escalates(&self, original: &Alert) -> &EscalationMetadata {
        assert_eq!(self.alert_type, AlertType::Escalation, "Expected an escalation alert");
        match &self.metadata {
            AlertMetadata::Escalation(meta) => {
                assert_eq!(
                    meta.original_alert_id, original.id,
                    "Escalation references the wrong alert"
                );
                meta
            }
            other => panic!("Expected escalation metadata, got {:?}", other),
        }
    }

    fn assert_open(&self) {
        assert!(
            !self.acknowledged && !self.resolved,
            "Expected alert {} to be open",
            self.id
        );
    }
}

/// Assert a percentage lies in [0, 100]
#[macro_export]
macro_rules! assert_percentage {
    ($value:expr) => {
        let value: f64 = $value;
        assert!(
            (0.0..=100.0).contains(&value),
            "Expected a percentage, got {}",
            value
        );
    };
}
