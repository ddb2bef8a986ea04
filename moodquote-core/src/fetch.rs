//! Bounded-retry structured fetch over an injected model caller

use async_trait::async_trait;

use crate::extract::{parse_and_validate, ExtractionError};
use crate::record::StructuredRecord;

/// Default number of model calls per fetch (one try plus one retry)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Anything that turns a prompt into raw model text.
///
/// Transport concerns (timeouts, HTTP status, credentials) belong to the
/// implementor. Its errors are propagated by [`ResponseExtractor`], never retried.
#[async_trait]
pub trait ModelCaller: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn call(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Settings for the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Total model calls allowed per fetch; values below 1 behave as 1
    pub max_attempts: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Result of a structured fetch that did not hit a caller error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Extracted {
        record: StructuredRecord,
        attempts: u32,
    },
    /// Every attempt produced unusable output; `reason` is the last failure
    Exhausted {
        attempts: u32,
        reason: ExtractionError,
    },
}

impl FetchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            FetchOutcome::Extracted { attempts, .. } | FetchOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn record(&self) -> Option<&StructuredRecord> {
        match self {
            FetchOutcome::Extracted { record, .. } => Some(record),
            FetchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<StructuredRecord> {
        match self {
            FetchOutcome::Extracted { record, .. } => Some(record),
            FetchOutcome::Exhausted { .. } => None,
        }
    }
}

/// Converts raw model output into validated records, owning the retry policy
#[derive(Debug, Clone, Default)]
pub struct ResponseExtractor {
    config: ExtractorConfig,
}

impl ResponseExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Parse one reply without calling anything
    pub fn parse(&self, text: &str) -> Result<StructuredRecord, ExtractionError> {
        parse_and_validate(text)
    }

    /// Call the model and validate its reply, re-sending the identical prompt
    /// until a record is recovered or the attempt budget runs out.
    pub async fn fetch_structured<C>(&self, prompt: &str, caller: &C) -> Result<FetchOutcome, C::Error>
    where
        C: ModelCaller + ?Sized,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let raw = caller.call(prompt).await?;

            match parse_and_validate(&raw) {
                Ok(record) => {
                    tracing::debug!("Structured reply accepted on attempt {}", attempt);
                    return Ok(FetchOutcome::Extracted {
                        record,
                        attempts: attempt,
                    });
                }
                Err(reason) if attempt < max_attempts => {
                    tracing::warn!(
                        "Attempt {}/{} returned unusable output ({}), retrying",
                        attempt,
                        max_attempts,
                        reason
                    );
                }
                Err(reason) => {
                    tracing::warn!(
                        "Giving up after {} attempt(s): {}",
                        attempt,
                        reason
                    );
                    return Ok(FetchOutcome::Exhausted {
                        attempts: attempt,
                        reason,
                    });
                }
            }
        }
    }
}

/// One-shot form of [`ResponseExtractor::fetch_structured`]
pub async fn fetch_structured<C>(prompt: &str, caller: &C, max_attempts: u32) -> Result<FetchOutcome, C::Error>
where
    C: ModelCaller + ?Sized,
{
    ResponseExtractor::default()
        .with_max_attempts(max_attempts)
        .fetch_structured(prompt, caller)
        .await
}
