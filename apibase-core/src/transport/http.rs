use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};

use super::Transport;
use super::config::TransportConfig;
use crate::error::{Error, NetworkError, Result};
use crate::request::{RequestBody, RequestDescriptor};
use crate::response::{HeaderMultiMap, HttpResponse};

/// [`Transport`] backed by a pooled `reqwest` client.
///
/// Response bodies are streamed and the exchange fails with
/// [`NetworkError::ResponseTooLarge`] once `max_response_size` is exceeded.
/// Non-success statuses are returned as responses; classification is the
/// pipeline's job.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if the proxy URL is invalid or the
    /// client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url)
                .map_err(|e| Error::initialization(format!("Invalid proxy URL: {e}")))?;

            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password);
            }
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::initialization(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_response_size: config.max_response_size,
        })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client, max_response_size: usize) -> Self {
        Self {
            client,
            max_response_size,
        }
    }

    fn header_map(request: &RequestDescriptor) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(request.headers.len() + 1);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_request(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::invalid_request(format!("Invalid value for header '{name}': {e}"))
            })?;
            headers.insert(name, value);
        }

        if !headers.contains_key(CONTENT_TYPE)
            && let Some(content_type) = request.body.content_type()
        {
            let value = HeaderValue::from_str(&content_type).map_err(|e| {
                Error::invalid_request(format!("Invalid content type '{content_type}': {e}"))
            })?;
            headers.insert(CONTENT_TYPE, value);
        }
        Ok(headers)
    }

    fn response_headers(response: &Response) -> HeaderMultiMap {
        let mut headers = HeaderMultiMap::new();
        for (name, value) in response.headers() {
            // HeaderName is already lower-case.
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        headers
    }

    async fn read_body(&self, response: Response, url: &str) -> Result<Vec<u8>> {
        let limit = self.max_response_size;

        if let Some(content_length) = response.content_length()
            && content_length > limit as u64
        {
            warn!(
                url = %url,
                content_length,
                limit,
                "Response exceeds size limit (Content-Length check)"
            );
            let size = usize::try_from(content_length).unwrap_or(usize::MAX);
            return Err(NetworkError::ResponseTooLarge { size, limit }.into());
        }

        let initial_capacity = response.content_length().map_or(8 * 1024, |len| {
            usize::try_from(len).unwrap_or(usize::MAX).min(limit)
        });

        let mut stream = response.bytes_stream();
        let mut body = Vec::with_capacity(initial_capacity);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let size = body.len().saturating_add(chunk.len());
            if size > limit {
                warn!(url = %url, size, limit, "Response exceeds size limit during streaming");
                return Err(NetworkError::ResponseTooLarge { size, limit }.into());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        name = "transport_send",
        skip(self, request),
        fields(method = %request.method, url = %request.url, status)
    )]
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(Self::header_map(request)?);

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Text(text) => builder.body(text.content.clone()),
            RequestBody::Form(fields) => builder.body(
                fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&"),
            ),
            RequestBody::Raw(raw) => builder.body(raw.bytes.clone()),
        };

        let response = builder.send().await.map_err(|e| {
            debug!(error = %e, "HTTP request send failed");
            Error::from(e)
        })?;

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);
        let headers = Self::response_headers(&response);
        let body = self.read_body(response, &request.url).await?;

        debug!(status, body_length = body.len(), "HTTP response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ApiRequest;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(max_response_size: usize) -> ReqwestTransport {
        ReqwestTransport::new(&TransportConfig {
            max_response_size,
            ..TransportConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_error_statuses_are_returned_as_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let request = ApiRequest::get("/fail").build(&server.uri(), &HashMap::new());
        let response = transport(1024).send(&request).await.unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.text(), "down");
    }

    #[tokio::test]
    async fn test_duplicate_headers_are_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "a=1")
                    .append_header("set-cookie", "b=2"),
            )
            .mount(&server)
            .await;

        let request = ApiRequest::get("/").build(&server.uri(), &HashMap::new());
        let response = transport(1024).send(&request).await.unwrap();
        assert_eq!(response.header_values("Set-Cookie"), ["a=1", "b=2"]);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let request = ApiRequest::get("/big").build(&server.uri(), &HashMap::new());
        let err = transport(16).send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Network(ref e) if matches!(**e, NetworkError::ResponseTooLarge { limit: 16, .. })
        ));
    }

    #[tokio::test]
    async fn test_text_body_sets_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/note"))
            .and(header("content-type", "text/plain; charset=utf-8"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::put("/note")
            .text_body("hello", "text/plain")
            .build(&server.uri(), &HashMap::new());
        let response = transport(1024).send(&request).await.unwrap();
        assert_eq!(response.status, 204);
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let request = ApiRequest::get("/")
            .header("bad header", "v")
            .build("https://h", &HashMap::new());
        assert!(matches!(
            ReqwestTransport::header_map(&request),
            Err(Error::InvalidRequest(_))
        ));
    }
}
