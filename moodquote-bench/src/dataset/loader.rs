//! JSON loading for datasets and quote databases

use moodquote::QuoteEntry;
use std::path::Path;

use super::EvaluationSample;

/// Error type for dataset loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0} is empty")]
    Empty(String),
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load evaluation samples from a JSON file
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<EvaluationSample>, LoadError> {
    let path = path.as_ref();
    let samples = load_dataset_from_str(&read(path)?)?;
    tracing::info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Parse evaluation samples from a JSON array
pub fn load_dataset_from_str(content: &str) -> Result<Vec<EvaluationSample>, LoadError> {
    let samples: Vec<EvaluationSample> = serde_json::from_str(content)
        .map_err(|e| LoadError::Parse(format!("dataset: {}", e)))?;
    if samples.is_empty() {
        return Err(LoadError::Empty("dataset".to_string()));
    }
    Ok(samples)
}

/// Load the quote database from a JSON file
pub fn load_quotes(path: impl AsRef<Path>) -> Result<Vec<QuoteEntry>, LoadError> {
    let path = path.as_ref();
    let quotes = load_quotes_from_str(&read(path)?)?;
    tracing::info!("Loaded {} quotes from {}", quotes.len(), path.display());
    Ok(quotes)
}

/// Parse a quote database; an empty database is allowed
pub fn load_quotes_from_str(content: &str) -> Result<Vec<QuoteEntry>, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(format!("quotes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SampleId;

    #[test]
    fn test_parse_dataset_with_mixed_ids() {
        let json = r#"[
            {"id": 1, "input": "I feel tired", "expected": {"mood": "tired", "quote": "Rest."}},
            {"id": "s2", "input": "so sad", "expected": {"mood": "sad"}},
            {"input": "no id here", "expected": {}}
        ]"#;
        let samples = load_dataset_from_str(json).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].id, Some(SampleId::Num(1)));
        assert_eq!(samples[0].expected.quote.as_deref(), Some("Rest."));
        assert_eq!(samples[1].id, Some(SampleId::Text("s2".to_string())));
        assert_eq!(samples[2].id, None);
        assert_eq!(samples[2].label(), "-");
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(load_dataset_from_str("[]"), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_sample_without_input_rejected() {
        let result = load_dataset_from_str(r#"[{"id": 1, "expected": {}}]"#);
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_parse_quotes() {
        let json = r#"[
            {"mood": "tired", "quote": "Rest is part of the work.", "author": "Unknown"},
            {"mood": "sad", "quote": "This too shall pass."}
        ]"#;
        let quotes = load_quotes_from_str(json).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].author, None);
    }

    #[test]
    fn test_missing_file() {
        let err = load_quotes("/nonexistent/quotes.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/quotes.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation_dataset.json");
        std::fs::write(&path, r#"[{"input": "tired", "expected": {"mood": "tired"}}]"#).unwrap();
        let samples = load_dataset(&path).unwrap();
        assert_eq!(samples[0].input, "tired");
    }
}
