//! Sampling and safety parameters sent with every model call.
//!
//! A [`GenerationConfig`] is built once per deployment (from config at process
//! start) and handed to the dispatcher. It is never derived from request data.

use serde::{Deserialize, Serialize};

/// Harm categories the provider filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// How aggressively a category is blocked, from strictest to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

impl SafetyThreshold {
    /// Wire name used in the provider payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            SafetyThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            SafetyThreshold::BlockNone => "BLOCK_NONE",
        }
    }

    /// The next level down in strictness (saturates at `BlockNone`).
    pub fn one_level_more_permissive(self) -> Self {
        match self {
            SafetyThreshold::BlockLowAndAbove => SafetyThreshold::BlockMediumAndAbove,
            SafetyThreshold::BlockMediumAndAbove => SafetyThreshold::BlockOnlyHigh,
            SafetyThreshold::BlockOnlyHigh | SafetyThreshold::BlockNone => {
                SafetyThreshold::BlockNone
            }
        }
    }
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    /// Wire name used in the provider payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// One threshold per harm category.
///
/// Sexual content sits one level more permissive than the rest so ordinary
/// reproductive-health questions are not filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySettings {
    #[serde(default = "default_strict")]
    pub harassment: SafetyThreshold,

    #[serde(default = "default_strict")]
    pub hate_speech: SafetyThreshold,

    #[serde(default = "default_sexual")]
    pub sexually_explicit: SafetyThreshold,

    #[serde(default = "default_strict")]
    pub dangerous_content: SafetyThreshold,
}

fn default_strict() -> SafetyThreshold {
    SafetyThreshold::BlockMediumAndAbove
}
fn default_sexual() -> SafetyThreshold {
    default_strict().one_level_more_permissive()
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            harassment: default_strict(),
            hate_speech: default_strict(),
            sexually_explicit: default_sexual(),
            dangerous_content: default_strict(),
        }
    }
}

impl SafetySettings {
    pub fn threshold(&self, category: HarmCategory) -> SafetyThreshold {
        match category {
            HarmCategory::Harassment => self.harassment,
            HarmCategory::HateSpeech => self.hate_speech,
            HarmCategory::SexuallyExplicit => self.sexually_explicit,
            HarmCategory::DangerousContent => self.dangerous_content,
        }
    }

    /// `(category, threshold)` pairs in a stable order.
    pub fn entries(&self) -> Vec<(HarmCategory, SafetyThreshold)> {
        HarmCategory::ALL
            .iter()
            .map(|c| (*c, self.threshold(*c)))
            .collect()
    }

    /// Whether sexual content is more permissive than every other category.
    pub fn relaxes_sexual_content(&self) -> bool {
        [self.harassment, self.hate_speech, self.dangerous_content]
            .iter()
            .all(|other| self.sexually_explicit > *other)
    }
}

/// Sampling and safety parameters for the provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling probability
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Maximum tokens in a reply
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default)]
    pub safety: SafetySettings,
}

fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.8
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            safety: SafetySettings::default(),
        }
    }
}
