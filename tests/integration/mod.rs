//! Integration tests for govwatch
//!
//! These tests drive the whole pipeline against mocked health endpoints.

pub mod config_tests;
pub mod escalation_tests;
pub mod pipeline_tests;
