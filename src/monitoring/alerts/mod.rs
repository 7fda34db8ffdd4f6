//! Alert evaluation, lifecycle and delivery
//!
//! Rules turn service metrics into candidate alerts, the manager
//! deduplicates and stores them, the dispatcher fans them out to channels,
//! and unacknowledged alerts are escalated on tokio timers.

mod channels;
mod dispatcher;
mod escalation;
mod events;
mod manager;
mod rules;
mod types;

pub use channels::{
    BrowserChannel, ChannelConfig, ChannelKind, ChannelSettings, ConsoleChannel, EmailChannel,
    NotificationChannel, SlackChannel, WEBHOOK_SOURCE, WebhookChannel, build_channel,
};
pub use dispatcher::{Delivery, DeliveryReport, NotificationDispatcher};
pub use events::{ALERT_EVENT, AlertEvent, AlertEventBus};
pub use manager::AlertManager;
pub use rules::{AlertRuleEngine, RuleEvaluation};
pub use types::{
    AlertCondition, AlertFilter, AlertRule, AlertStats, ComparisonOperator, EscalationRule,
    MatchMode, MetricKind,
};
