use thiserror::Error;

/// Error types that can occur when talking to the remote assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Authentication and authorization errors, including a missing key
    #[error("Auth error: {0}")]
    AuthError(String),
    /// The provider asked us to slow down
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Invalid request parameters or builder configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Errors returned by the provider
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// API response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// The request did not complete within its deadline
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
}

/// Converts reqwest HTTP errors into AssistantErrors
impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl AssistantError {
    /// Maps a non-success HTTP status and its body onto an error variant.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => AssistantError::AuthError(body),
            429 => AssistantError::RateLimited(body),
            400 | 404 | 422 => AssistantError::InvalidRequest(format!("{status}: {body}")),
            _ => AssistantError::ProviderError(format!("{status}: {body}")),
        }
    }
}
