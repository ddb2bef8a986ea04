//! Token usage accounting
//!
//! Providers that report usage are trusted as-is. Everything else falls back to
//! a rough four-characters-per-token estimate.

use serde::{Deserialize, Serialize};

/// Where a usage figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Provider,
    Heuristic,
}

/// Prompt/completion token counts for one model call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u32,
    pub completion: u32,
    pub total: u32,
    pub source: TokenSource,
}

impl TokenUsage {
    /// Usage as reported by a provider
    pub fn reported(prompt: u32, completion: u32) -> Self {
        Self {
            prompt,
            completion,
            total: prompt.saturating_add(completion),
            source: TokenSource::Provider,
        }
    }

    /// Heuristic usage for a prompt/response pair
    pub fn estimate(prompt_text: &str, response_text: &str) -> Self {
        let prompt = estimate_tokens(prompt_text);
        let completion = estimate_tokens(response_text);
        Self {
            prompt,
            completion,
            total: prompt.saturating_add(completion),
            source: TokenSource::Heuristic,
        }
    }
}

/// Roughly four characters per token, never less than one for non-empty text
pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    let chars = text.chars().count() as u32;
    (chars / 4).max(1)
}

/// Token logging settings, handed to whatever component makes model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLogging {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for TokenLogging {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl TokenLogging {
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Emit a usage line if logging is enabled
    pub fn log(&self, usage: &TokenUsage) {
        if !self.enabled {
            return;
        }
        let source = match usage.source {
            TokenSource::Provider => "provider",
            TokenSource::Heuristic => "heuristic",
        };
        tracing::info!(
            target: "moodquote::tokens",
            "Token usage ({}): prompt={} completion={} total={}",
            source,
            usage.prompt,
            usage.completion,
            usage.total
        );
    }

    /// Estimate and log usage for a prompt/response pair
    pub fn log_estimate(&self, prompt_text: &str, response_text: &str) -> TokenUsage {
        let usage = TokenUsage::estimate(prompt_text, response_text);
        self.log(&usage);
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("abcdefghi"), 2);
    }

    #[test]
    fn test_estimate_counts_chars_not_bytes() {
        // four two-byte chars
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn test_usage_totals() {
        let usage = TokenUsage::estimate("a".repeat(40).as_str(), "b".repeat(8).as_str());
        assert_eq!(usage.prompt, 10);
        assert_eq!(usage.completion, 2);
        assert_eq!(usage.total, 12);
        assert_eq!(usage.source, TokenSource::Heuristic);

        let reported = TokenUsage::reported(7, 5);
        assert_eq!(reported.total, 12);
        assert_eq!(reported.source, TokenSource::Provider);
    }

    #[test]
    fn test_reported_total_saturates() {
        let usage = TokenUsage::reported(u32::MAX, 5);
        assert_eq!(usage.total, u32::MAX);
        assert_eq!(usage.prompt, u32::MAX);
        assert_eq!(usage.completion, 5);
    }
}
