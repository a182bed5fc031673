//! apibase core library
//!
//! Shared runtime for generated REST and WebSocket API clients: request
//! assembly, a single-slot throttle gate with cooldown, error classification,
//! and a pipeline that turns raw HTTP exchanges into typed results or typed
//! failures.
//!
//! # Features
//!
//! - **Throttle gate**: one call in flight per gate, a fixed cooldown after
//!   each call, optional bounded backlog
//! - **Pluggable seams**: [`Transport`], [`ErrorClassifier`] and
//!   [`PayloadCodec`] are traits with reqwest/JSON defaults
//! - **Error handling**: one [`Error`] enum built with `thiserror`, carrying
//!   status codes and raw bodies for API failures
//! - **Observability**: `tracing` spans per call plus a per-client verbosity
//!   threshold
//!
//! # Example
//!
//! ```rust,no_run
//! use apibase_core::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct Item {
//!     id: u64,
//! }
//!
//! # async fn example() -> Result<()> {
//! let client = ApiClient::new(
//!     ClientConfig::builder()
//!         .base_path("https://api.example.com/v1")
//!         .build(),
//! )?;
//!
//! let request = ApiRequest::get("/items/{id}").path_param("id", "42");
//! let item: Item = client.send(request).await?;
//! assert_eq!(item.id, 42);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

pub use serde;
pub use serde_json;

pub mod classifier;
pub mod client;
pub mod codec;
pub mod error;
pub mod logging;
pub mod params;
pub mod request;
pub mod request_log;
pub mod response;
pub mod throttle;
pub mod transport;
pub mod ws_client;

pub use classifier::{
    DefaultClassifier, ErrorClassifier, PayloadClassifier, SuccessFlagClassifier, classify_status,
};
pub use client::{ApiClient, ApiClientBuilder, ClientConfig, ClientConfigBuilder, Interceptors};
pub use codec::{JsonCodec, PayloadCodec};
pub use error::{
    ApiErrorDetails, ConfigValidationError, ContextExt, DecodeError, Error, ErrorKind,
    NetworkError, Result, ValidationResult,
};
pub use request::{ApiRequest, HttpMethod, RequestBody, RequestDescriptor};
pub use response::{ApiResponse, HeaderMultiMap, HttpResponse};
pub use throttle::{AdmissionPolicy, ThrottleConfig, ThrottleGate};
pub use transport::{ReqwestTransport, Transport, TransportConfig};
pub use ws_client::{WsApiClient, WsApiConfig, WsConnectionState, WsMessage, WsMessageHandler};

/// Prelude module for convenient imports
///
/// ```rust
/// use apibase_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::classifier::{
        DefaultClassifier, ErrorClassifier, PayloadClassifier, SuccessFlagClassifier,
    };
    pub use crate::client::{ApiClient, ClientConfig};
    pub use crate::codec::{JsonCodec, PayloadCodec};
    pub use crate::error::{ContextExt, Error, ErrorKind, Result};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::params::{CollectionFormat, parameter_to_string, parameters_to_map};
    pub use crate::request::{ApiRequest, HttpMethod, RequestDescriptor};
    pub use crate::response::{ApiResponse, HttpResponse};
    pub use crate::throttle::{AdmissionPolicy, ThrottleConfig, ThrottleGate};
    pub use crate::transport::{Transport, TransportConfig};
    pub use crate::ws_client::{WsApiClient, WsApiConfig, WsMessage, WsMessageHandler};
    pub use serde::{Deserialize, Serialize};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
