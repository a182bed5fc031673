//! Shared helpers for integration tests.

#![allow(dead_code)]

use apibase::ClientConfig;
use apibase::client::ClientConfigBuilder;
use apibase::logging::LogLevel;
use std::time::Duration;
use wiremock::MockServer;

/// Config pointing at `server` with a short cooldown and quiet logging.
pub fn config_for(server: &MockServer) -> ClientConfigBuilder {
    ClientConfig::builder()
        .base_path(server.uri())
        .cooldown(Duration::from_millis(10))
        .log_level(LogLevel::Off)
}

/// Installs a test subscriber once per process.
pub fn init_test_logging() {
    apibase::logging::try_init_logging(&apibase::logging::LogConfig::test());
}
