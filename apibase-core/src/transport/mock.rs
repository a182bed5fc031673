use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::Transport;
use crate::error::{Error, Result};
use crate::request::RequestDescriptor;
use crate::response::HttpResponse;

#[derive(Debug)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// In-memory transport replaying queued replies in order.
///
/// Every request is recorded. When the queue is empty the exchange fails with
/// a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    latency: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queues a response.
    pub fn respond(&self, response: HttpResponse) -> &Self {
        lock(&self.replies).push_back(Reply::Respond(response));
        self
    }

    /// Queues a JSON response with a `content-type` header.
    pub fn respond_json(&self, status: u16, body: &Value) -> &Self {
        self.respond(
            HttpResponse::new(status, body.to_string())
                .with_header("content-type", "application/json"),
        )
    }

    /// Queues a transport fault.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Reply::Fail(message.into()));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        lock(&self.requests).push(request.clone());
        let reply = lock(&self.replies).pop_front();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(Error::network(message)),
            None => Err(Error::network(format!(
                "no scripted reply for {} {}",
                request.method, request.url
            ))),
        }
    }
}
