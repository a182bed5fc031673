//! # apibase
//!
//! Base layer for generated REST and WebSocket API clients.
//!
//! Generated clients build [`ApiRequest`]s and hand them to an [`ApiClient`],
//! which serializes calls through a throttle gate, classifies failures into
//! typed [`Error`]s and decodes payloads into caller types.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apibase::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::new(
//!         ClientConfig::builder()
//!             .base_path("https://api.example.com")
//!             .build(),
//!     )?;
//!     let status: serde_json::Value = client.get("/status").await?;
//!     println!("{status}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub use apibase_core::{
    ApiClient, ApiRequest, ApiResponse, ClientConfig, Error, ErrorKind, HttpResponse, Result,
    ThrottleGate, WsApiClient, WsApiConfig,
};

pub use apibase_core::{
    classifier, client, codec, error, logging, params, request, response, throttle, transport,
    ws_client,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use apibase_core::prelude::*;
}
