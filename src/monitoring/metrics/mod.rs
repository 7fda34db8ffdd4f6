//! Metrics aggregation
//!
//! Derives uptime, average latency and error rate from health histories.

mod aggregator;
mod types;


pub use aggregator::{MetricsAggregator, compute_metrics};
pub use types::{AVAILABILITY_WINDOW, RESPONSE_TIME_WINDOW, ServiceMetrics};
