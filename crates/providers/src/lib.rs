//! Generative-model provider implementations for CycleMate.
//!
//! All providers implement the `cyclemate_core::Provider` trait.
//! [`build_from_config`] selects and constructs the configured backend.

pub mod gemini;

use std::sync::Arc;

use cyclemate_config::AppConfig;
use cyclemate_core::error::ProviderError;
use cyclemate_core::provider::Provider;

pub use gemini::GeminiProvider;

/// Build the configured provider.
///
/// A missing API key is not an error here; the provider reports
/// `NotConfigured` on first use so the gateway can still start.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider_config = &config.provider;
    let api_key = provider_config.api_key.clone().unwrap_or_default();
    let timeout = std::time::Duration::from_secs(provider_config.request_timeout_secs);

    match provider_config.name.as_str() {
        "gemini" => {
            let mut provider =
                GeminiProvider::with_timeout(api_key, &provider_config.model, timeout);
            if let Some(url) = &provider_config.api_url {
                provider = provider.with_base_url(url);
            }
            Ok(Arc::new(provider))
        }
        other => Err(ProviderError::NotConfigured(format!(
            "unknown provider '{other}' (supported: gemini)"
        ))),
    }
}
