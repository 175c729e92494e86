//! Gemini provider implementation.
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//!
//! Supports:
//! - Multi-turn `contents` with `user` / `model` roles
//! - `generationConfig` sampling parameters
//! - Per-category `safetySettings`
//! - Health checks against the model metadata endpoint

use async_trait::async_trait;
use cyclemate_core::error::ProviderError;
use cyclemate_core::generation::GenerationConfig;
use cyclemate_core::message::TurnSequence;
use cyclemate_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini generative-model provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new provider for `model`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(api_key, model, std::time::Duration::from_secs(60))
    }

    /// Create a provider whose HTTP client gives up after `timeout`.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Point the provider at a different base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert a turn sequence into Gemini `contents`.
    fn to_api_contents(turns: &TurnSequence) -> Vec<ApiContent> {
        turns
            .turns()
            .iter()
            .map(|t| ApiContent {
                role: t.role.as_str().into(),
                parts: vec![ApiPart {
                    text: Some(t.text.clone()),
                }],
            })
            .collect()
    }

    /// Build the full `generateContent` body.
    fn to_api_request(turns: &TurnSequence, generation: &GenerationConfig) -> ApiRequest {
        ApiRequest {
            contents: Self::to_api_contents(turns),
            generation_config: ApiGenerationConfig {
                temperature: generation.temperature,
                top_p: generation.top_p,
                top_k: generation.top_k,
                max_output_tokens: generation.max_output_tokens,
            },
            safety_settings: generation
                .safety
                .entries()
                .into_iter()
                .map(|(category, threshold)| ApiSafetySetting {
                    category: category.as_str().into(),
                    threshold: threshold.as_str().into(),
                })
                .collect(),
        }
    }

    /// Map a non-success HTTP status to a provider error.
    fn error_for_status(status: u16, body: &str) -> ProviderError {
        // Prefer the structured `{error: {status, message}}` envelope if present.
        let detail = serde_json::from_str::<ApiErrorEnvelope>(body)
            .map(|e| format!("{}: {}", e.error.status, e.error.message))
            .unwrap_or_else(|_| body.to_string());

        match status {
            429 => ProviderError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => ProviderError::AuthenticationFailed(detail),
            408 | 504 => ProviderError::Timeout(detail),
            _ => ProviderError::ApiError {
                status_code: status,
                message: detail,
            },
        }
    }

    /// Turn a parsed body into a response, surfacing safety blocks.
    fn from_api_response(
        api_response: ApiResponse,
        fallback_model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Some(reason) = api_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ProviderError::Blocked(format!("prompt blocked ({reason})")));
        }

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("no candidates in response".into()))?;

        if matches!(
            candidate.finish_reason.as_deref(),
            Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST")
        ) {
            return Err(ProviderError::Blocked(format!(
                "candidate blocked ({})",
                candidate.finish_reason.unwrap_or_default()
            )));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse(
                "candidate contained no text".into(),
            ));
        }

        let usage = api_response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderResponse {
            text,
            usage,
            model: api_response
                .model_version
                .unwrap_or_else(|| fallback_model.to_string()),
        })
    }

    fn transport_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl cyclemate_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "no API key set for gemini".into(),
            ));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::to_api_request(&request.turns, &request.generation);

        debug!(
            model = %self.model,
            turns = request.turns.len(),
            est_tokens = request.turns.estimated_tokens(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, "Gemini returned error");
            return Err(Self::error_for_status(status, &error_body));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::ApiError {
                    status_code: status,
                    message: format!("Failed to parse response: {e}"),
                }
            }
        })?;

        Self::from_api_response(api_response, &self.model)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    generation_config: ApiGenerationConfig,
    safety_settings: Vec<ApiSafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiSafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}
