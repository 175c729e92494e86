//! The chat pipeline.
//!
//! Each request moves through a fixed sequence of stages:
//!
//! ```text
//! validate → window → annotate → assemble → dispatch → (reply | classify)
//! ```
//!
//! Validation failures stop before any provider call. Everything else ends in
//! exactly one provider call, whose outcome is either returned verbatim or
//! replaced by a classified fallback. Nothing is retained between requests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cyclemate_config::{AppConfig, ConversationConfig};
use cyclemate_core::classification::ErrorClassification;
use cyclemate_core::error::ValidationError;
use cyclemate_core::generation::GenerationConfig;
use cyclemate_core::message::TurnSequence;
use cyclemate_core::provider::Provider;
use cyclemate_core::request::{ChatRequest, ValidatedRequest};
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::{BuildInput, TurnBuilder};
use crate::dispatcher::Dispatcher;
use crate::prompt::SystemPromptTemplate;
use crate::topics::TopicAnnotation;
use crate::window::HistoryWindow;

/// Reply shown when the request itself was unusable.
pub const VALIDATION_REPLY: &str =
    "Please type a message so I can help. Your question can be about anything cycle related.";

/// The outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// The provider answered. `reply` is its text, untouched.
    Succeeded {
        reply: String,
        timestamp: DateTime<Utc>,
    },
    /// The provider call failed and was classified.
    Failed(ErrorClassification),
    /// The request never reached the provider.
    Rejected(ValidationError),
}

/// Wire shape of a [`ChatReply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ChatReply {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Text to show the requester.
    pub fn reply_text(&self) -> &str {
        match self {
            Self::Succeeded { reply, .. } => reply,
            Self::Failed(classification) => &classification.fallback_message,
            Self::Rejected(_) => VALIDATION_REPLY,
        }
    }

    /// Status for the HTTP boundary. Kinds without a status are served as 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Succeeded { .. } => 200,
            Self::Failed(classification) => classification.http_status.unwrap_or(500),
            Self::Rejected(_) => 400,
        }
    }

    pub fn body(&self) -> ReplyBody {
        match self {
            Self::Succeeded { reply, timestamp } => ReplyBody {
                error: None,
                reply: reply.clone(),
                detail: None,
                success: true,
                timestamp: Some(timestamp.to_rfc3339()),
            },
            Self::Failed(classification) => ReplyBody {
                error: Some(classification.kind.as_str()),
                reply: classification.fallback_message.clone(),
                detail: None,
                success: false,
                timestamp: None,
            },
            Self::Rejected(err) => ReplyBody {
                error: Some("validation_failed"),
                reply: VALIDATION_REPLY.to_string(),
                detail: Some(err.to_string()),
                success: false,
                timestamp: None,
            },
        }
    }
}

/// What would be sent for a request, without sending it.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub older_turns: usize,
    pub recent_turns: usize,
    pub annotation: Option<TopicAnnotation>,
    pub estimated_tokens: usize,
    pub turns: TurnSequence,
}

/// Stateless request handler. Safe to share across concurrent requests.
pub struct ChatAssistant {
    builder: TurnBuilder,
    dispatcher: Dispatcher,
    max_pairs: usize,
    annotate_older_turns: bool,
}

impl ChatAssistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        generation: GenerationConfig,
        template: SystemPromptTemplate,
        conversation: &ConversationConfig,
    ) -> Self {
        Self {
            builder: TurnBuilder::new(template),
            dispatcher: Dispatcher::new(provider, Arc::new(generation)),
            max_pairs: conversation.max_pairs,
            annotate_older_turns: conversation.annotate_older_turns,
        }
    }

    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self::new(
            provider,
            config.generation.clone(),
            SystemPromptTemplate::from(&config.persona),
            &config.conversation,
        )
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        self.dispatcher.provider()
    }

    pub fn max_pairs(&self) -> usize {
        self.max_pairs
    }

    /// Handle one request end to end.
    pub async fn respond(&self, request: &ChatRequest) -> ChatReply {
        let validated = match request.validate() {
            Ok(validated) => validated,
            Err(err) => {
                info!(reason = %err, "Rejected chat request");
                return ChatReply::Rejected(err);
            }
        };

        let assembly = self.assemble(&validated);

        match self.dispatcher.dispatch(assembly.turns).await {
            Ok(response) => ChatReply::Succeeded {
                reply: response.text,
                timestamp: Utc::now(),
            },
            Err(classification) => ChatReply::Failed(classification),
        }
    }

    /// Validate and assemble without calling the provider.
    pub fn preview(&self, request: &ChatRequest) -> Result<Preview, ValidationError> {
        let validated = request.validate()?;
        let assembly = self.assemble(&validated);
        Ok(Preview {
            older_turns: assembly.older_turns,
            recent_turns: assembly.recent_turns,
            annotation: assembly.annotation,
            estimated_tokens: assembly.turns.estimated_tokens(),
            turns: assembly.turns,
        })
    }

    fn assemble(&self, request: &ValidatedRequest) -> Assembly {
        let window = HistoryWindow::split(&request.history, self.max_pairs);
        debug!(
            stage = "windowed",
            older = window.older.len(),
            recent = window.recent.len(),
            "History split"
        );

        let annotation = if self.annotate_older_turns && window.has_older() {
            TopicAnnotation::extract(window.older)
        } else {
            None
        };
        debug!(
            stage = "annotated",
            labels = annotation.as_ref().map_or(0, |a| a.labels().count()),
            "Older turns summarized"
        );

        let turns = self.builder.build(&BuildInput {
            recent: window.recent,
            annotation: annotation.as_ref(),
            message: &request.message,
            requester_name: request.requester_name.as_deref(),
        });
        debug!(
            stage = "assembled",
            turns = turns.len(),
            estimated_tokens = turns.estimated_tokens(),
            "Turn sequence ready"
        );

        Assembly {
            older_turns: window.older.len(),
            recent_turns: window.recent.len(),
            annotation,
            turns,
        }
    }
}

struct Assembly {
    older_turns: usize,
    recent_turns: usize,
    annotation: Option<TopicAnnotation>,
    turns: TurnSequence,
}
