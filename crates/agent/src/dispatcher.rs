//! Response dispatcher: one provider call per request, classified on failure.

use std::sync::Arc;

use cyclemate_core::classification::ErrorClassification;
use cyclemate_core::generation::GenerationConfig;
use cyclemate_core::message::TurnSequence;
use cyclemate_core::provider::{Provider, ProviderRequest, ProviderResponse};
use tracing::{debug, warn};

use crate::classifier;

/// Submits a turn sequence with the deployment's generation config.
///
/// There is no retry: a failed call is classified and returned as-is.
pub struct Dispatcher {
    provider: Arc<dyn Provider>,
    generation: Arc<GenerationConfig>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn Provider>, generation: Arc<GenerationConfig>) -> Self {
        Self {
            provider,
            generation,
        }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Call the provider once. Success text is returned unchanged.
    pub async fn dispatch(
        &self,
        turns: TurnSequence,
    ) -> Result<ProviderResponse, ErrorClassification> {
        let request = ProviderRequest {
            turns,
            generation: (*self.generation).clone(),
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    provider = self.provider.name(),
                    model = %response.model,
                    reply_len = response.text.len(),
                    "Provider call succeeded"
                );
                Ok(response)
            }
            Err(e) => {
                let classification = classifier::classify_provider_error(&e);
                // Raw text goes to logs only.
                warn!(
                    provider = self.provider.name(),
                    kind = %classification.kind,
                    error = %e,
                    "Provider call failed"
                );
                Err(classification)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclemate_core::classification::ErrorKind;
    use cyclemate_core::error::ProviderError;
    use std::sync::Mutex;

    /// Records the last request and replays a scripted result.
    struct RecordingProvider {
        result: Result<String, ProviderError>,
        seen: Mutex<Vec<ProviderRequest>>,
    }

    #[async_trait::async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            self.result.clone().map(|text| ProviderResponse {
                text,
                usage: None,
                model: "mock".into(),
            })
        }
    }

    fn dispatcher(result: Result<String, ProviderError>) -> (Dispatcher, Arc<RecordingProvider>) {
        let provider = Arc::new(RecordingProvider {
            result,
            seen: Mutex::new(Vec::new()),
        });
        let generation = Arc::new(GenerationConfig {
            temperature: 0.3,
            ..GenerationConfig::default()
        });
        (Dispatcher::new(provider.clone(), generation), provider)
    }

    #[tokio::test]
    async fn success_text_is_unchanged() {
        let (dispatcher, provider) = dispatcher(Ok("  Try iron-rich foods...\n".into()));
        let turns = TurnSequence::new("sys", "hi", &[], "q");

        let response = dispatcher.dispatch(turns.clone()).await.unwrap();
        assert_eq!(response.text, "  Try iron-rich foods...\n");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].turns, turns);
        assert!((seen[0].generation.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn failure_is_classified_without_retry() {
        let (dispatcher, provider) =
            dispatcher(Err(ProviderError::RateLimited { retry_after_secs: 5 }));
        let err = dispatcher
            .dispatch(TurnSequence::new("sys", "hi", &[], "q"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.http_status, Some(429));
        assert_eq!(provider.seen.lock().unwrap().len(), 1);
    }
}
