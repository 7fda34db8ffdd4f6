//! Configuration validation
//!
//! - `trait_def`: core Validate trait definition
//! - `monitoring_validators`: services, polling and logging
//! - `alerting_validators`: rules, channels and escalation
//! - `tests`: test suite for all validators

mod alerting_validators;
mod monitoring_validators;
mod trait_def;

pub use monitoring_validators::validate_services;
pub use trait_def::Validate;
