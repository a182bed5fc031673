use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ApiClient;
use crate::error::{Error, Result};
use crate::request::ApiRequest;
use crate::response::ApiResponse;

impl ApiClient {
    /// Runs the full pipeline and returns the decoded envelope.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call_api`] or [`ApiClient::resolve`].
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<ApiResponse<T>> {
        let response = self.call_api(request).await?;
        self.resolve(response)
    }

    /// Runs the full pipeline and returns only the decoded payload.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call`].
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.call(request).await.map(ApiResponse::into_data)
    }

    /// Encodes `body` with the client codec as the request body.
    fn with_encoded_body<B: Serialize + ?Sized>(
        &self,
        request: ApiRequest,
        body: &B,
    ) -> Result<ApiRequest> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::invalid_request(format!("Failed to serialize request body: {e}")))?;
        let content = self.inner.codec.encode(&value)?;
        Ok(request.text_body(content, self.inner.codec.media_type()))
    }

    /// GET `path` and decode the payload.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// POST `body` to `path` and decode the payload.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if `body` cannot be encoded, otherwise any
    /// error from [`ApiClient::call`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.with_encoded_body(ApiRequest::post(path), body)?;
        self.send(request).await
    }

    /// PUT `body` to `path` and decode the payload.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] if `body` cannot be encoded, otherwise any
    /// error from [`ApiClient::call`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.with_encoded_body(ApiRequest::put(path), body)?;
        self.send(request).await
    }

    /// DELETE `path` and decode the payload.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// HEAD `path`. The empty body decodes as `null`, so `T` is usually `()`.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call`].
    pub async fn head<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::head(path)).await
    }

    /// OPTIONS `path` and decode the payload.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::call`].
    pub async fn options<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::options(path)).await
    }
}
