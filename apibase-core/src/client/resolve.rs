use serde::de::DeserializeOwned;
use tracing::{error, info};

use super::ApiClient;
use crate::error::{DecodeError, Error, Result};
use crate::logging::LogLevel;
use crate::response::{ApiResponse, HttpResponse};

impl ApiClient {
    /// Decodes a raw response into a typed envelope.
    ///
    /// The body is decoded by the client codec (an empty body becomes JSON
    /// `null`), checked by the payload classifier, then deserialized into `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] if the body is not UTF-8, not valid for the codec,
    ///   or does not match `T`
    /// - the classifier's error (usually [`Error::Payload`]) when the payload
    ///   reports a failure
    pub fn resolve<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<ApiResponse<T>> {
        let log_level = self.log_level();
        let HttpResponse {
            status,
            headers,
            body,
        } = response;

        let result = self.decode_payload::<T>(&body);
        match result {
            Ok(data) => {
                if log_level.allows(LogLevel::Info) {
                    info!(
                        client_id = %self.id(),
                        status,
                        body = %String::from_utf8_lossy(&body),
                        "Resolved response"
                    );
                }
                Ok(ApiResponse::new(status, headers, data))
            }
            Err(err) => {
                if log_level.allows(LogLevel::Error) {
                    error!(
                        client_id = %self.id(),
                        status,
                        error = %err,
                        "Failed to resolve response"
                    );
                }
                Err(err)
            }
        }
    }

    fn decode_payload<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let text = std::str::from_utf8(body).map_err(|e| Error::decode(DecodeError::Utf8(e)))?;
        let value = self.inner.codec.decode(text)?;

        if let Some(err) = self.inner.classifier.classify_payload(&value) {
            return Err(err);
        }

        serde_json::from_value(value).map_err(|e| Error::decode(DecodeError::Json(e)))
    }
}
