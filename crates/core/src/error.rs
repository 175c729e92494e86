//! Error types for the CycleMate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; there is no catch-all enum.

use thiserror::Error;

/// Failures raised by a generative-model provider.
///
/// The `Display` text is the only thing the error classifier looks at, so each
/// variant spells out the indicator words an upstream message would carry.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider (429, quota exceeded), retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Response blocked by safety filters: {0}")]
    Blocked(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider returned an empty response: {0}")]
    EmptyResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Structural violations in an incoming chat request.
///
/// These are detected before any model call and are distinct from the
/// runtime failure kinds produced by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message is required")]
    MissingMessage,

    #[error("message must not be empty or whitespace-only")]
    EmptyMessage,

    #[error("history[{index}].content must not be empty or whitespace-only")]
    EmptyHistoryContent { index: usize },

    #[error("request body is not well-formed: {0}")]
    MalformedBody(String),
}
