//! Evaluation datasets and the quote database

pub mod loader;

pub use loader::{
    load_dataset, load_dataset_from_str, load_quotes, load_quotes_from_str, LoadError,
};

use moodquote::PartialRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample identifier; datasets use both numbers and strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleId {
    Num(i64),
    Text(String),
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleId::Num(n) => write!(f, "{}", n),
            SampleId::Text(s) => f.write_str(s),
        }
    }
}

/// One labelled evaluation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SampleId>,
    pub input: String,
    #[serde(default)]
    pub expected: PartialRecord,
}

impl EvaluationSample {
    pub fn new(input: impl Into<String>, expected: PartialRecord) -> Self {
        Self {
            id: None,
            input: input.into(),
            expected,
        }
    }

    pub fn with_id(mut self, id: SampleId) -> Self {
        self.id = Some(id);
        self
    }

    /// Id for display; `-` when the sample has none
    pub fn label(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
