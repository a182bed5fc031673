//! Transport capability.
//!
//! A [`Transport`] performs one HTTP exchange for a [`RequestDescriptor`] and
//! returns the raw [`HttpResponse`] whatever its status. Failures to complete
//! the exchange surface as [`Error::Network`](crate::Error::Network) (or
//! [`Error::Timeout`](crate::Error::Timeout)). Implementations must accept
//! concurrent calls.

mod config;
mod http;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::request::RequestDescriptor;
use crate::response::HttpResponse;

pub use config::{DEFAULT_USER_AGENT, ProxyConfig, TransportConfig};
pub use http::ReqwestTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::ScriptedTransport;

/// Performs HTTP exchanges.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error only when the exchange could not be completed.
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse>;
}
