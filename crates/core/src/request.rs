//! The incoming chat request and its structural validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::message::Turn;

/// A chat request as sent by the caller.
///
/// `history` is chronological (oldest first). `requester_name` comes from the
/// identity provider and is treated as opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub history: Vec<Turn>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
}

/// A request that passed validation. The message is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub message: String,
    pub history: Vec<Turn>,
    pub requester_name: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_requester_name(mut self, name: impl Into<String>) -> Self {
        self.requester_name = Some(name.into());
        self
    }

    /// Check structural constraints before any model call is attempted.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let message = self
            .message
            .as_deref()
            .ok_or(ValidationError::MissingMessage)?;
        if message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }

        if let Some(index) = self
            .history
            .iter()
            .position(|turn| turn.content.trim().is_empty())
        {
            return Err(ValidationError::EmptyHistoryContent { index });
        }

        // A blank display name is the same as no name.
        let requester_name = self
            .requester_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from);

        Ok(ValidatedRequest {
            message: message.to_string(),
            history: self.history.clone(),
            requester_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_message_is_rejected() {
        let err = ChatRequest::new(" ").validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyMessage);
    }

    #[test]
    fn missing_message_is_rejected() {
        let request: ChatRequest = serde_json::from_str(r#"{"history": []}"#).unwrap();
        assert_eq!(request.validate().unwrap_err(), ValidationError::MissingMessage);
    }

    #[test]
    fn message_is_kept_verbatim() {
        let validated = ChatRequest::new("  Why so tired?\n").validate().unwrap();
        assert_eq!(validated.message, "  Why so tired?\n");
    }

    #[test]
    fn empty_history_entry_is_rejected_with_index() {
        let request = ChatRequest::new("hello").with_history(vec![
            Turn::requester("first"),
            Turn::assistant("   "),
        ]);
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::EmptyHistoryContent { index: 1 }
        );
    }

    #[test]
    fn camel_case_wire_format() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","history":[{"role":"user","content":"a"}],"requesterName":"Maya"}"#,
        )
        .unwrap();
        let validated = request.validate().unwrap();
        assert_eq!(validated.requester_name.as_deref(), Some("Maya"));
        assert_eq!(validated.history.len(), 1);
    }

    #[test]
    fn blank_requester_name_is_absent() {
        let validated = ChatRequest::new("hi")
            .with_requester_name("  ")
            .validate()
            .unwrap();
        assert!(validated.requester_name.is_none());
    }

    #[test]
    fn history_that_is_not_a_list_fails_to_parse() {
        let result = serde_json::from_str::<ChatRequest>(r#"{"message":"hi","history":"oops"}"#);
        assert!(result.is_err());
    }
}
