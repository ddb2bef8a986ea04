//! LLM provider implementations

pub mod caller;
pub mod gemini;
pub mod response;
pub mod traits;

pub use caller::ProviderCaller;
pub use gemini::GeminiClient;
pub use response::{ResponseShape, ResponseText};
pub use traits::{
    CompletionRequest, CompletionResponse, LLMProvider, ProviderError, ProviderResult,
};

use crate::config::{Config, ProviderConfig};
use std::sync::Arc;

/// Apply config settings to a Gemini client
fn configure_gemini(client: GeminiClient, pc: &ProviderConfig) -> GeminiClient {
    let client = client
        .with_rate_limits(pc.rpm, pc.tpm)
        .with_model(&pc.default_model);
    match &pc.base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    }
}

/// Config key for a provider name or alias, case-insensitive
pub fn canonical_provider_name(name: &str) -> Option<&'static str> {
    match name.to_lowercase().as_str() {
        "gemini" | "google" => Some("gemini"),
        _ => None,
    }
}

fn unknown_provider(name: &str) -> ProviderError {
    ProviderError::Config(format!("Unknown provider: {}", name))
}

/// Create a provider by name, applying settings from config
///
/// The API key is read from the environment variable named in the
/// provider's config section.
pub fn create_provider_with_config(
    name: &str,
    config: &Config,
) -> ProviderResult<Arc<dyn LLMProvider + Send + Sync>> {
    let canonical = canonical_provider_name(name).ok_or_else(|| unknown_provider(name))?;
    match canonical {
        "gemini" => {
            let client = match config.get_provider(canonical) {
                Some(pc) => {
                    if !pc.enabled {
                        return Err(ProviderError::Config("provider gemini is disabled".to_string()));
                    }
                    configure_gemini(GeminiClient::from_env_var(&pc.api_key_env)?, pc)
                }
                None => GeminiClient::from_env()?,
            };
            Ok(Arc::new(client))
        }
        _ => Err(unknown_provider(name)),
    }
}

/// Build a [`ProviderCaller`] for the named provider with the configured
/// generation settings, timeout and token logging
pub fn create_caller_with_config(name: &str, config: &Config) -> ProviderResult<ProviderCaller> {
    let canonical = canonical_provider_name(name).ok_or_else(|| unknown_provider(name))?;
    let provider = create_provider_with_config(canonical, config)?;
    let mut caller = ProviderCaller::new(provider, config.generation.clone())
        .with_token_logging(config.tokens);
    if let Some(pc) = config.get_provider(canonical) {
        caller = caller.with_timeout(std::time::Duration::from_millis(pc.timeout_ms));
    }
    Ok(caller)
}
