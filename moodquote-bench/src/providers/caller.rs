//! Adapter from an [`LLMProvider`] to the extractor's [`ModelCaller`] seam

use async_trait::async_trait;
use moodquote::{ModelCaller, TokenLogging};
use std::sync::Arc;
use std::time::Duration;

use super::traits::{CompletionRequest, LLMProvider, ProviderError};
use crate::config::GenerationConfig;

/// Sends prompts to a provider with fixed generation settings.
///
/// The request timeout lives here, on the calling side of the extractor.
pub struct ProviderCaller {
    provider: Arc<dyn LLMProvider + Send + Sync>,
    generation: GenerationConfig,
    timeout: Duration,
    token_logging: TokenLogging,
}

impl ProviderCaller {
    pub fn new(provider: Arc<dyn LLMProvider + Send + Sync>, generation: GenerationConfig) -> Self {
        Self {
            provider,
            generation,
            timeout: Duration::from_secs(30),
            token_logging: TokenLogging::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_logging(mut self, token_logging: TokenLogging) -> Self {
        self.token_logging = token_logging;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_request(&self, prompt: &str) -> CompletionRequest {
        let mut request = CompletionRequest::new(prompt, self.generation.max_tokens)
            .with_temperature(self.generation.temperature);
        if let Some(top_k) = self.generation.top_k {
            request = request.with_top_k(top_k);
        }
        if let Some(top_p) = self.generation.top_p {
            request = request.with_top_p(top_p);
        }
        if let Some(model) = &self.generation.model {
            request = request.with_model(model);
        }
        request
    }
}

#[async_trait]
impl ModelCaller for ProviderCaller {
    type Error = ProviderError;

    async fn call(&self, prompt: &str) -> Result<String, Self::Error> {
        let request = self.build_request(prompt);
        tracing::info!(
            "[Model call] provider={} temperature={:.2} top_k={:?} top_p={:?}",
            self.provider.name(),
            self.generation.temperature,
            self.generation.top_k,
            self.generation.top_p
        );

        let response = match tokio::time::timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        tracing::debug!(
            "{} replied in {}ms (finish_reason={})",
            response.model,
            response.latency_ms,
            response.finish_reason
        );
        self.token_logging.log(&response.usage);

        Ok(response.content)
    }
}
