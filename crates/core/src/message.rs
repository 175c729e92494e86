//! Turn and turn-sequence domain types.
//!
//! These are the value objects that flow through one request:
//! caller history → [`Turn`]s → window split → [`TurnSequence`] → provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The author of a turn, in the assistant's own two-role vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The person talking to the assistant
    #[serde(rename = "user")]
    Requester,
    /// The assistant itself
    #[serde(rename = "assistant")]
    Assistant,
}

/// The two-role vocabulary the generative-model call contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    User,
    Model,
}

impl From<Role> for ProviderRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Requester => ProviderRole::User,
            Role::Assistant => ProviderRole::Model,
        }
    }
}

impl From<ProviderRole> for Role {
    fn from(role: ProviderRole) -> Self {
        match role {
            ProviderRole::User => Role::Requester,
            ProviderRole::Model => Role::Assistant,
        }
    }
}

impl ProviderRole {
    /// Wire name used in the provider payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderRole::User => "user",
            ProviderRole::Model => "model",
        }
    }
}

/// A single role-tagged message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who wrote this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// When the turn was created (callers usually omit it)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn authored by the requester.
    pub fn requester(content: impl Into<String>) -> Self {
        Self {
            role: Role::Requester,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a turn authored by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_requester(&self) -> bool {
        self.role == Role::Requester
    }
}

/// One entry of a [`TurnSequence`], already in provider vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTurn {
    pub role: ProviderRole,
    pub text: String,
}

impl ProviderTurn {
    fn from_turn(turn: &Turn) -> Self {
        Self {
            role: turn.role.into(),
            text: turn.content.clone(),
        }
    }
}

/// The fully ordered list of turns submitted to the model for one request.
///
/// Layout is fixed by construction:
/// `[system, greeting, recent..., current]`.
/// The system turn is authored by the requester role and the greeting by the
/// assistant role, so the sequence always opens with a user/model exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTurnSequence")]
pub struct TurnSequence {
    turns: Vec<ProviderTurn>,
}

#[derive(Deserialize)]
struct RawTurnSequence {
    turns: Vec<ProviderTurn>,
}

impl TryFrom<RawTurnSequence> for TurnSequence {
    type Error = String;

    /// Deserialized sequences must keep the `[system, greeting, .., current]` layout.
    fn try_from(raw: RawTurnSequence) -> Result<Self, Self::Error> {
        let turns = raw.turns;
        if turns.len() < Self::FIXED_TURNS {
            return Err(format!(
                "turn sequence needs at least {} turns, got {}",
                Self::FIXED_TURNS,
                turns.len()
            ));
        }
        let layout_ok = turns[0].role == ProviderRole::User
            && turns[1].role == ProviderRole::Model
            && turns[turns.len() - 1].role == ProviderRole::User;
        if !layout_ok {
            return Err("turn sequence must open with user/model and end with a user turn".into());
        }
        Ok(Self { turns })
    }
}

impl TurnSequence {
    /// Number of turns that are always present (system, greeting, current).
    pub const FIXED_TURNS: usize = 3;

    /// Assemble a sequence. `current` is stored verbatim.
    pub fn new(
        system: impl Into<String>,
        greeting: impl Into<String>,
        recent: &[Turn],
        current: impl Into<String>,
    ) -> Self {
        let mut turns = Vec::with_capacity(recent.len() + Self::FIXED_TURNS);
        turns.push(ProviderTurn {
            role: ProviderRole::User,
            text: system.into(),
        });
        turns.push(ProviderTurn {
            role: ProviderRole::Model,
            text: greeting.into(),
        });
        turns.extend(recent.iter().map(ProviderTurn::from_turn));
        turns.push(ProviderTurn {
            role: ProviderRole::User,
            text: current.into(),
        });
        Self { turns }
    }

    /// All turns in submission order.
    pub fn turns(&self) -> &[ProviderTurn] {
        &self.turns
    }

    pub fn system(&self) -> &ProviderTurn {
        &self.turns[0]
    }

    pub fn greeting(&self) -> &ProviderTurn {
        &self.turns[1]
    }

    /// The verbatim history slice between the greeting and the current turn.
    pub fn history(&self) -> &[ProviderTurn] {
        &self.turns[2..self.turns.len() - 1]
    }

    /// The final turn, holding the current message.
    pub fn current(&self) -> &ProviderTurn {
        &self.turns[self.turns.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: a sequence holds at least [`Self::FIXED_TURNS`] turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Rough token estimate (4 chars ≈ 1 token), for logging.
    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(|t| t.text.len().div_ceil(4)).sum()
    }
}
