//! The CycleMate chat pipeline.
//!
//! A request flows through these stages:
//!
//! 1. **Validate** the message and history ([`cyclemate_core::ChatRequest::validate`])
//! 2. **Window** the history into recent and older turns ([`window`])
//! 3. **Annotate** older requester turns with topic labels ([`topics`])
//! 4. **Assemble** the provider turn sequence ([`builder`], [`prompt`])
//! 5. **Dispatch** a single provider call ([`dispatcher`])
//! 6. **Classify** failures into user-safe fallbacks ([`classifier`])
//!
//! [`ChatAssistant`] ties the stages together.

pub mod assistant;
pub mod builder;
pub mod classifier;
pub mod dispatcher;
pub mod prompt;
pub mod topics;
pub mod window;

pub use assistant::{ChatAssistant, ChatReply, Preview, ReplyBody, VALIDATION_REPLY};
pub use builder::{BuildInput, TurnBuilder};
pub use classifier::{classify, classify_provider_error, fallback_message};
pub use dispatcher::Dispatcher;
pub use prompt::SystemPromptTemplate;
pub use topics::TopicAnnotation;
pub use window::HistoryWindow;
