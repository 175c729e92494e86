//! Failure taxonomy for provider calls.
//!
//! The classifier itself lives in `cyclemate-agent`; this module only holds
//! the types every other crate consumes.

use serde::{Deserialize, Serialize};

/// The taxonomy label assigned to a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimited,
    ContentBlocked,
    Timeout,
    InvalidInput,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ContentBlocked => "content_blocked",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// HTTP status for this kind. `InvalidInput` has none at this layer.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ErrorKind::RateLimited => Some(429),
            ErrorKind::ContentBlocked => Some(400),
            ErrorKind::Timeout => Some(504),
            ErrorKind::InvalidInput => None,
            ErrorKind::Unknown => Some(500),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of classifying one failed provider call.
///
/// Built fresh per failure. `source_error` keeps the raw upstream text for
/// logs only and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    pub kind: ErrorKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,

    pub fallback_message: String,

    #[serde(skip)]
    pub source_error: Option<String>,
}

impl ErrorClassification {
    pub fn new(kind: ErrorKind, fallback_message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status: kind.http_status(),
            fallback_message: fallback_message.into(),
            source_error: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_error = Some(source.into());
        self
    }
}
