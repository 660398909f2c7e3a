//! Judge error types.

use thiserror::Error;

/// Errors that can occur when calling a judge backend.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// The backend returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// No API key configured; the call was not attempted.
    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The reply could not be read as an assessment.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl JudgeError {
    /// Classify a transport error from reqwest.
    pub(crate) fn from_transport(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            JudgeError::Timeout(timeout_secs)
        } else {
            JudgeError::NetworkError(e.to_string())
        }
    }

    /// Read the `retry-after` header of a 429 response, in milliseconds.
    pub(crate) fn rate_limited(response: &reqwest::Response) -> Self {
        let retry_after_ms = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        JudgeError::RateLimited { retry_after_ms }
    }
}
