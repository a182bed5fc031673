//! Client configuration structures and builders

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{ConfigValidationError, ValidationResult};
use crate::logging::LogLevel;
use crate::request::is_absolute_url;
use crate::throttle::{AdmissionPolicy, ThrottleConfig};
use crate::transport::TransportConfig;

/// API client configuration.
///
/// `base_path` and `use_throttle` are fixed once a client is built; the
/// remaining settings seed values that can be changed on a live client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL prefixed to relative operation paths.
    pub base_path: String,
    /// Headers sent with every request unless overridden per request.
    pub default_headers: HashMap<String, String>,
    /// Route transmissions through the throttle gate.
    pub use_throttle: bool,
    /// Throttle gate settings.
    pub throttle: ThrottleConfig,
    /// Per-call timeout around transmission. `None` disables it.
    pub timeout: Option<Duration>,
    /// Verbosity threshold for request and response logging.
    pub log_level: LogLevel,
    /// Settings of the default HTTP transport.
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            default_headers: HashMap::new(),
            use_throttle: true,
            throttle: ThrottleConfig::default(),
            timeout: None,
            log_level: LogLevel::Info,
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration builder.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apibase_core::client::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder()
    ///     .base_path("https://api.example.com/")
    ///     .default_header("Accept", "application/json")
    ///     .cooldown(Duration::from_millis(250))
    ///     .build();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Rejects an empty or non-HTTP(S) `base_path`, a zero `timeout`, and any
    /// error reported by the throttle or transport settings.
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        if self.base_path.is_empty() {
            return Err(ConfigValidationError::missing("base_path"));
        }
        if !is_absolute_url(&self.base_path) {
            return Err(ConfigValidationError::invalid(
                "base_path",
                format!("'{}' is not an http(s) URL", self.base_path),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigValidationError::too_low("timeout", "0s", "1ms"));
        }

        let mut result = self.throttle.validate()?;
        result.merge(self.transport.validate()?);
        if !self.use_throttle && self.throttle != ThrottleConfig::default() {
            result.add_warning("throttle settings are ignored while use_throttle is false");
        }
        Ok(result)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    /// Adds a default header.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    /// Adds several default headers.
    pub fn default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.config.default_headers.extend(headers);
        self
    }

    /// Enables or disables the throttle gate.
    pub fn use_throttle(mut self, enabled: bool) -> Self {
        self.config.use_throttle = enabled;
        self
    }

    /// Sets the whole throttle configuration.
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.config.throttle = throttle;
        self
    }

    /// Sets the throttle cooldown.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.config.throttle.cooldown = cooldown;
        self
    }

    /// Sets a bounded backlog with the given limit.
    pub fn pending_limit(mut self, pending_limit: usize) -> Self {
        self.config.throttle.policy = AdmissionPolicy::Bounded { pending_limit };
        self
    }

    /// Lets every caller queue without a backlog limit.
    pub fn unbounded_backlog(mut self) -> Self {
        self.config.throttle.policy = AdmissionPolicy::Unbounded;
        self
    }

    /// Sets the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Sets the verbosity threshold.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Sets the default transport settings.
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
