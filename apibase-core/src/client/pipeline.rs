use std::time::Duration;
use tracing::{Span, error, info, instrument};

use super::ApiClient;
use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::request::{ApiRequest, RequestDescriptor};
use crate::request_log::RequestLog;
use crate::response::HttpResponse;

impl ApiClient {
    /// Runs a request through the pipeline and returns the raw response.
    ///
    /// Stages: build, pre-request hook, sequence increment, throttled (or
    /// inline) transmission, transport classification, post-response hook.
    /// The first failing stage ends the call.
    ///
    /// # Errors
    ///
    /// - [`Error::Capacity`] if the throttle backlog is full
    /// - [`Error::Timeout`] if the per-call timeout elapses
    /// - [`Error::Network`] if the transport could not complete the exchange
    /// - the classifier's error (usually [`Error::Api`]) for failed statuses
    #[instrument(
        name = "api_call",
        skip(self, request),
        fields(
            client_id = %self.id(),
            method = %request.method(),
            path = %request.path(),
            seq,
            status
        )
    )]
    pub async fn call_api(&self, request: ApiRequest) -> Result<HttpResponse> {
        let settings = self.settings();
        let mut descriptor = request.build(self.base_path(), &settings.default_headers);
        self.inner.hooks.pre_request(&mut descriptor);

        let seq = self.next_sequence();
        Span::current().record("seq", seq);

        if settings.log_level.allows(LogLevel::Info) {
            let summary = RequestLog::new(self.id(), seq, &descriptor);
            info!(
                client_id = %self.id(),
                seq,
                request = %summary.to_pretty_json(),
                "Sending request"
            );
        }

        let transmitted = if self.uses_throttle() {
            self.inner
                .gate
                .execute(|| self.transmit(&descriptor, settings.timeout))
                .await
        } else {
            self.transmit(&descriptor, settings.timeout).await
        };

        let mut response = match transmitted {
            Ok(response) => response,
            Err(err) => {
                if settings.log_level.allows(LogLevel::Error) {
                    error!(
                        client_id = %self.id(),
                        seq,
                        url = %descriptor.url,
                        error = %err,
                        "Request failed"
                    );
                }
                return Err(err);
            }
        };
        Span::current().record("status", response.status);

        if let Some(err) = self
            .inner
            .classifier
            .classify_transport(&descriptor, &response)
        {
            if settings.log_level.allows(LogLevel::Error) {
                error!(
                    client_id = %self.id(),
                    seq,
                    status = response.status,
                    body_preview = %response.body_preview(),
                    error = %err,
                    "Request returned an error status"
                );
            }
            return Err(err);
        }

        self.inner.hooks.post_response(&descriptor, &mut response);
        Ok(response)
    }

    async fn transmit(
        &self,
        descriptor: &RequestDescriptor,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse> {
        let send = self.inner.transport.send(descriptor);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, send).await.map_err(|_elapsed| {
                Error::timeout(format!(
                    "Request to {} timed out after {}ms",
                    descriptor.url,
                    limit.as_millis()
                ))
            })?,
            None => send.await,
        }
    }
}
