//! Error types for API operations.

/// An error returned by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server returned an HTTP error response.
    #[error("API error {status}: {content}")]
    Response {
        /// HTTP status code of the response.
        status: reqwest::StatusCode,
        /// Raw response body content.
        content: String,
    },

    /// Could not reach the server (DNS failure, timeout, TLS error,
    /// connection refused, etc.)
    #[error("not connected: {0}")]
    NotConnected(String),

    /// Catch-all for other errors (serialization, IO, etc.)
    #[error("other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return ApiError::Response {
                status,
                // The body is checked before deserialization, so this branch
                // only fires for transport-level status errors with no body.
                content: String::new(),
            };
        }

        // Connection errors, timeouts, and errors sending requests all mean
        // the server could not be reached.
        if e.is_connect() || e.is_timeout() || e.is_request() {
            return ApiError::NotConnected(e.to_string());
        }

        ApiError::Other(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Other(e.to_string())
    }
}

/// Deserialize a response, converting non-success statuses into
/// [`ApiError::Response`] with the body preserved.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let content = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Response { status, content });
    }
    Ok(serde_json::from_str(&content)?)
}
