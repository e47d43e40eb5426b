//! Judge adapter error types.

use thiserror::Error;

/// Errors that can occur when calling an LLM judge backend.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The model replied with something that is not a valid judgment.
    #[error("unparseable judgment: {0}")]
    Unparseable(String),
}
