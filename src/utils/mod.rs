//! Utility modules
//!
//! - **error**: crate error type and `Result` alias
//! - **logging**: `tracing` subscriber setup

pub mod error;
pub mod logging;
