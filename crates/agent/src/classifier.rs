//! Provider failure classifier.
//!
//! This is the only place that reads raw provider error text. The message is
//! lower-cased and tested against an ordered pattern table; the first row
//! with a matching indicator wins. Anything unmatched is `Unknown`.
//!
//! | Order | Kind | Indicators | Status |
//! |-------|------|------------|--------|
//! | 1 | RateLimited | `quota`, `429`, `rate limit`, `resource_exhausted` | 429 |
//! | 2 | ContentBlocked | `safety`, `blocked` | 400 |
//! | 3 | Timeout | `timeout`, `timed out`, `deadline` | 504 |
//! | 4 | InvalidInput | `invalid` | none |
//! | 5 | Unknown | (anything else) | 500 |

use cyclemate_core::classification::{ErrorClassification, ErrorKind};
use cyclemate_core::error::ProviderError;

/// Ordered, first-match-wins pattern table.
pub const PATTERNS: &[(ErrorKind, &[&str])] = &[
    (
        ErrorKind::RateLimited,
        &["quota", "429", "rate limit", "resource_exhausted"],
    ),
    (ErrorKind::ContentBlocked, &["safety", "blocked"]),
    (ErrorKind::Timeout, &["timeout", "timed out", "deadline"]),
    (ErrorKind::InvalidInput, &["invalid"]),
];

const RATE_LIMITED_REPLY: &str = "I'm getting a lot of questions right now and need a short \
    breather. Please wait a moment and try again.";
const CONTENT_BLOCKED_REPLY: &str = "I can't help with that particular request. I'm here for \
    questions about your cycle, symptoms, period care, and overall wellbeing. Is there \
    something along those lines I can help with?";
const TIMEOUT_REPLY: &str = "That took longer than expected and your message didn't go \
    through. Please send it again.";
const INVALID_INPUT_REPLY: &str = "I had trouble understanding that message. Could you \
    rephrase it?";
const UNKNOWN_REPLY: &str = "I'm sorry, something went wrong on my end. Please try again \
    in a little while.";

/// The fixed user-safe reply for a kind.
pub fn fallback_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::RateLimited => RATE_LIMITED_REPLY,
        ErrorKind::ContentBlocked => CONTENT_BLOCKED_REPLY,
        ErrorKind::Timeout => TIMEOUT_REPLY,
        ErrorKind::InvalidInput => INVALID_INPUT_REPLY,
        ErrorKind::Unknown => UNKNOWN_REPLY,
    }
}

/// Pick the kind for a raw error message.
pub fn classify_kind(message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    PATTERNS
        .iter()
        .find(|(_, indicators)| indicators.iter().any(|i| message.contains(i)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ErrorKind::Unknown)
}

/// Classify a raw error message. The message is kept only as `source_error`.
pub fn classify(message: &str) -> ErrorClassification {
    let kind = classify_kind(message);
    ErrorClassification::new(kind, fallback_message(kind)).with_source(message)
}

/// Classify a provider failure by its display text.
pub fn classify_provider_error(error: &ProviderError) -> ErrorClassification {
    classify(&error.to_string())
}
