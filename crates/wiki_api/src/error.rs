use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised below the session layer: transport, HTTP status, body
/// decoding, and API-reported error objects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} {message}")]
    Status { status: StatusCode, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("API error ({code}): {info}")]
    Api { code: String, info: String },
}

impl ApiError {
    /// True for failures where the API never produced a usable answer.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Api { .. })
    }

    /// Server-supplied error code, when the API reported one.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
