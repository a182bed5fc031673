//! API client and request pipeline.
//!
//! Every call runs the same linear sequence of stages and stops at the first
//! failure:
//!
//! ```text
//! Build -> PreIntercept -> Admit (throttle) -> Transmit -> ClassifyTransport
//!       -> PostIntercept -> [raw HttpResponse]
//!       -> Decode -> ClassifyPayload -> [ApiResponse<T>]
//! ```
//!
//! [`ApiClient::call_api`] runs the stages up to the raw response,
//! [`ApiClient::resolve`] runs the rest, and [`ApiClient::call`] and the verb
//! helpers compose both.
//!
//! # Example
//!
//! ```rust,no_run
//! use apibase_core::client::{ApiClient, ClientConfig};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Item {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn example() -> apibase_core::Result<()> {
//! let client = ApiClient::new(
//!     ClientConfig::builder()
//!         .base_path("https://api.example.com/")
//!         .build(),
//! )?;
//!
//! let item: Item = client.get("/items/42").await?;
//! println!("{} {}", item.id, item.name);
//! # Ok(())
//! # }
//! ```

mod config;
mod hooks;
mod pipeline;
mod resolve;
mod verbs;


use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::classifier::{DefaultClassifier, ErrorClassifier};
use crate::codec::{JsonCodec, PayloadCodec};
use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::request::{RequestDescriptor, insert_header};
use crate::response::HttpResponse;
use crate::throttle::ThrottleGate;
use crate::transport::{ReqwestTransport, Transport};

pub use config::{ClientConfig, ClientConfigBuilder};
pub use hooks::{Interceptors, PostResponseHook, PreRequestHook};

/// Length of the random client identifier.
pub const CLIENT_ID_LEN: usize = 6;

/// Settings read at call time and changeable on a live client.
#[derive(Debug, Clone)]
struct RuntimeSettings {
    default_headers: HashMap<String, String>,
    log_level: LogLevel,
    timeout: Option<Duration>,
}

#[derive(Debug)]
struct ClientInner {
    id: String,
    base_path: String,
    use_throttle: bool,
    transport: Arc<dyn Transport>,
    gate: ThrottleGate,
    classifier: Arc<dyn ErrorClassifier>,
    codec: Arc<dyn PayloadCodec>,
    hooks: Interceptors,
    settings: RwLock<RuntimeSettings>,
    request_count: AtomicU64,
}

/// Base client shared by generated API clients.
///
/// Cloning is cheap; clones are the same logical client and share the
/// identifier, request counter, settings and throttle gate.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Creates a client with the default transport, classifier and codec.
    ///
    /// # Errors
    ///
    /// Returns an initialization error if the configuration is invalid or the
    /// HTTP transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Creates a builder for injecting collaborators.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// Random 6-character identifier used in logs.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Base URL for relative paths.
    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }

    /// Number of calls issued so far.
    pub fn request_count(&self) -> u64 {
        self.inner.request_count.load(Ordering::Acquire)
    }

    /// Whether transmissions go through the throttle gate.
    pub fn uses_throttle(&self) -> bool {
        self.inner.use_throttle
    }

    /// The throttle gate; its cooldown and policy can be adjusted live.
    pub fn throttle(&self) -> &ThrottleGate {
        &self.inner.gate
    }

    /// Adds or replaces a default header for subsequent calls.
    pub fn add_default_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.update_settings(|s| insert_header(&mut s.default_headers, name.into(), value.into()));
    }

    /// Removes a default header, ignoring case.
    pub fn remove_default_header(&self, name: &str) {
        self.update_settings(|s| {
            s.default_headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        });
    }

    /// Current default headers.
    pub fn default_headers(&self) -> HashMap<String, String> {
        self.settings().default_headers
    }

    /// Current verbosity threshold.
    pub fn log_level(&self) -> LogLevel {
        self.settings().log_level
    }

    /// Changes the verbosity threshold for subsequent calls.
    pub fn set_log_level(&self, level: LogLevel) {
        self.update_settings(|s| s.log_level = level);
    }

    /// Current per-call timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.settings().timeout
    }

    /// Changes the per-call timeout for subsequent calls.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.update_settings(|s| s.timeout = timeout);
    }

    fn settings(&self) -> RuntimeSettings {
        self.inner
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_settings(&self, update: impl FnOnce(&mut RuntimeSettings)) {
        let mut settings = self
            .inner
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut settings);
    }

    fn next_sequence(&self) -> u64 {
        self.inner.request_count.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Builder for [`ApiClient`] with injectable collaborators.
///
/// ```rust
/// use apibase_core::classifier::SuccessFlagClassifier;
/// use apibase_core::client::{ApiClient, ClientConfig};
///
/// let client = ApiClient::builder(
///     ClientConfig::builder().base_path("https://api.example.com").build(),
/// )
/// .classifier(SuccessFlagClassifier::default())
/// .on_request(|request| request.set_header("X-Trace", "1"))
/// .build()
/// .unwrap();
/// assert_eq!(client.id().len(), 6);
/// ```
#[derive(Debug)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    classifier: Option<Arc<dyn ErrorClassifier>>,
    codec: Option<Arc<dyn PayloadCodec>>,
    gate: Option<ThrottleGate>,
    hooks: Interceptors,
}

impl ApiClientBuilder {
    /// Starts from `config` with default collaborators.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            classifier: None,
            codec: None,
            gate: None,
            hooks: Interceptors::default(),
        }
    }

    /// Uses `transport` instead of the reqwest-backed default.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses an already shared transport.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses `classifier` instead of [`DefaultClassifier`].
    pub fn classifier(mut self, classifier: impl ErrorClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Uses `codec` instead of [`JsonCodec`].
    pub fn codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Shares an existing gate; the configured throttle settings are ignored.
    pub fn throttle_gate(mut self, gate: ThrottleGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Replaces both interception hooks.
    pub fn interceptors(mut self, hooks: Interceptors) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the pre-request hook.
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestDescriptor) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_request(hook);
        self
    }

    /// Sets the post-response hook.
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestDescriptor, &mut HttpResponse) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_response(hook);
        self
    }

    /// Validates the configuration and assembles the client.
    ///
    /// # Errors
    ///
    /// Returns an error of kind
    /// [`ErrorKind::Initialization`](crate::ErrorKind::Initialization) if
    /// validation fails or the default transport cannot be built.
    pub fn build(self) -> Result<ApiClient> {
        let config = self.config;
        let validation = config.validate().map_err(Error::from)?;
        for warning in &validation.warnings {
            tracing::warn!(warning = %warning, "Client configuration warning");
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.transport)?),
        };

        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(CLIENT_ID_LEN);

        tracing::debug!(
            client_id = %id,
            base_path = %config.base_path,
            use_throttle = config.use_throttle,
            "API client created"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                id,
                base_path: config.base_path,
                use_throttle: config.use_throttle,
                transport,
                gate: self
                    .gate
                    .unwrap_or_else(|| ThrottleGate::new(config.throttle)),
                classifier: self
                    .classifier
                    .unwrap_or_else(|| Arc::new(DefaultClassifier)),
                codec: self.codec.unwrap_or_else(|| Arc::new(JsonCodec::new())),
                hooks: self.hooks,
                settings: RwLock::new(RuntimeSettings {
                    default_headers: config.default_headers,
                    log_level: config.log_level,
                    timeout: config.timeout,
                }),
                request_count: AtomicU64::new(0),
            }),
        })
    }
}
