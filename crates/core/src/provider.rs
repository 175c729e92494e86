//! Provider trait: the abstraction over the generative-model backend.
//!
//! A Provider takes one assembled [`TurnSequence`] plus the deployment's
//! [`GenerationConfig`] and returns generated text or a raised error. It is
//! called exactly once per chat request; retries are not its concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generation::GenerationConfig;
use crate::message::TurnSequence;

/// A single request to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The ordered turns to submit
    pub turns: TurnSequence,

    /// Sampling and safety parameters
    pub generation: GenerationConfig,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated text, unchanged
    pub text: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The dispatcher calls `complete()` without knowing which backend is in use.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check. Can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                text: request.turns.current().text.clone(),
                usage: None,
                model: "echo-1".into(),
            })
        }
    }

    #[tokio::test]
    async fn default_health_check_is_ok() {
        assert!(EchoProvider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn provider_receives_the_sequence() {
        let request = ProviderRequest {
            turns: TurnSequence::new("sys", "hi", &[], "ping"),
            generation: GenerationConfig::default(),
        };
        let response = EchoProvider.complete(request).await.unwrap();
        assert_eq!(response.text, "ping");
        assert_eq!(response.model, "echo-1");
    }
}
