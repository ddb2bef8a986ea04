//! Configuration management for moodquote
//!
//! Loads provider, generation and evaluation settings from TOML files.

use moodquote::{ExtractorConfig, SamplingParams, TokenLogging};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::providers::gemini;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub tokens: TokenLogging,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub default_model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Requests per minute
    #[serde(default = "default_rpm")]
    pub rpm: u32,
    /// Tokens per minute
    #[serde(default = "default_tpm")]
    pub tpm: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Sampling settings sent with every live request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Overrides the provider's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            top_k: None,
            top_p: None,
            max_tokens: default_max_tokens(),
        }
    }
}

impl GenerationConfig {
    /// The same knobs, as understood by the mock model
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature as f64,
            top_k: self.top_k.map(|k| k as usize),
            top_p: self.top_p.map(|p| p as f64),
        }
    }
}

/// Structured-output extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl ExtractionConfig {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_attempts: self.max_attempts,
        }
    }
}

/// Offline evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,
    #[serde(default = "default_quotes_file")]
    pub quotes_file: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Seed for the mock model; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            dataset_file: default_dataset_file(),
            quotes_file: default_quotes_file(),
            output_dir: default_output_dir(),
            seed: None,
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_rpm() -> u32 { 60 }
fn default_tpm() -> u32 { 100_000 }
fn default_timeout_ms() -> u64 { 30_000 }
fn default_max_tokens() -> u32 { 512 }
fn default_max_attempts() -> u32 { moodquote::DEFAULT_MAX_ATTEMPTS }
fn default_dataset_file() -> String { "evaluation_dataset.json".to_string() }
fn default_quotes_file() -> String { "quotes.json".to_string() }
fn default_output_dir() -> String { "results/runs".to_string() }

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from default config location or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = ["config/moodquote.toml", "moodquote.toml"];

        for path in &config_paths {
            if let Ok(config) = Self::from_file(path) {
                tracing::info!("Loaded configuration from {}", path);
                return config;
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get a specific provider config
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "gemini".to_string(),
            ProviderConfig {
                name: "gemini".to_string(),
                enabled: true,
                default_model: gemini::DEFAULT_MODEL.to_string(),
                base_url: None,
                api_key_env: gemini::DEFAULT_API_KEY_ENV.to_string(),
                rpm: 60,
                tpm: 100_000,
                timeout_ms: default_timeout_ms(),
            },
        );

        Self {
            providers,
            generation: GenerationConfig::default(),
            extraction: ExtractionConfig::default(),
            evaluation: EvaluationConfig::default(),
            tokens: TokenLogging::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.providers.contains_key("gemini"));
        assert_eq!(config.extraction.max_attempts, 2);
        assert!(config.tokens.enabled);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[providers.gemini]
name = "gemini"
default_model = "gemini-pro"
api_key_env = "MY_KEY"
rpm = 10

[generation]
temperature = 0.7
top_k = 8

[extraction]
max_attempts = 3

[tokens]
enabled = false
"#;
        let config = Config::from_toml(toml).unwrap();
        let gemini = config.get_provider("gemini").unwrap();
        assert_eq!(gemini.default_model, "gemini-pro");
        assert_eq!(gemini.tpm, 100_000);
        assert_eq!(config.generation.top_k, Some(8));
        assert_eq!(config.generation.max_tokens, 512);
        assert_eq!(config.extraction.max_attempts, 3);
        assert!(!config.tokens.enabled);
        assert_eq!(config.evaluation.quotes_file, "quotes.json");
    }

    #[test]
    fn test_sampling_params_from_generation() {
        let generation = GenerationConfig {
            temperature: 0.5,
            top_k: Some(3),
            top_p: Some(0.5),
            ..Default::default()
        };
        let params = generation.sampling_params();
        assert_eq!(params.top_k, Some(3));
        assert_eq!(params.top_p, Some(0.5));
        assert_eq!(params.temperature, 0.5);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodquote.toml");
        Config::default().save_toml(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.generation, GenerationConfig::default());
        assert!(loaded.get_provider("gemini").is_some());
    }
}
