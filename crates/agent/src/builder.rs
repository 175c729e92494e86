//! Turn builder. Assembles the exact sequence sent to the provider.
//!
//! # Layout
//!
//! | Position | Role | Content |
//! |----------|------|---------|
//! | 0 | user | System prompt (+ optional annotation suffix) |
//! | 1 | model | Scripted greeting |
//! | 2..n-1 | as authored | Recent window, original order |
//! | n | user | Current message, verbatim |
//!
//! # Determinism
//!
//! Building is a pure transformation: identical inputs always produce
//! identical sequences. No I/O, clock, or random state is consulted.

use cyclemate_core::message::{Turn, TurnSequence};

use crate::prompt::SystemPromptTemplate;
use crate::topics::TopicAnnotation;

/// All inputs the builder needs for one request.
#[derive(Debug, Clone, Copy)]
pub struct BuildInput<'a> {
    /// The verbatim window, oldest first.
    pub recent: &'a [Turn],
    /// Summary of turns outside the window, if any matched.
    pub annotation: Option<&'a TopicAnnotation>,
    /// The current message, exactly as received.
    pub message: &'a str,
    /// Display name from the identity provider.
    pub requester_name: Option<&'a str>,
}

/// Stateless builder. Create one per deployment and reuse it.
#[derive(Debug, Clone, Default)]
pub struct TurnBuilder {
    template: SystemPromptTemplate,
}

impl TurnBuilder {
    pub fn new(template: SystemPromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &SystemPromptTemplate {
        &self.template
    }

    pub fn build(&self, input: &BuildInput<'_>) -> TurnSequence {
        let system = self.template.render(input.requester_name, input.annotation);
        let greeting = self.template.greeting(input.requester_name);
        TurnSequence::new(system, greeting, input.recent, input.message)
    }
}
