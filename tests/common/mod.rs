//! Common test utilities for govwatch
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{fixtures, mock_health};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let server = mock_health(503).await;
//!     let config = fixtures::ConfigFactory::single_service("ac", &server.uri());
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod fixtures;

// Re-export commonly used items
pub use fixtures::{ConfigFactory, RuleFactory};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a server whose `/health` always answers `status`
pub async fn mock_health(status: u16) -> MockServer {
    let server = MockServer::start().await;
    mount_health(&server, ResponseTemplate::new(status), None).await;
    server
}

/// Mount a `/health` response, optionally limited to `times` matches
pub async fn mount_health(server: &MockServer, template: ResponseTemplate, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(template);
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}
