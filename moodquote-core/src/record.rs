//! Structured record types shared by extraction, scoring and mock selection

use serde::{Deserialize, Serialize};

/// One of the four fields every structured record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Mood,
    Quote,
    Author,
    SuggestedAction,
}

impl Field {
    /// Canonical order, used for validation and reporting
    pub const ALL: [Field; 4] = [
        Field::Mood,
        Field::Quote,
        Field::Author,
        Field::SuggestedAction,
    ];

    /// JSON key of the field
    pub fn key(&self) -> &'static str {
        match self {
            Field::Mood => "mood",
            Field::Quote => "quote",
            Field::Author => "author",
            Field::SuggestedAction => "suggested_action",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Read access to record fields; absent fields are `None`
pub trait RecordFields {
    fn field(&self, field: Field) -> Option<&str>;
}

/// A validated model reply. All four fields are present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub mood: String,
    pub quote: String,
    pub author: String,
    pub suggested_action: String,
}

impl StructuredRecord {
    pub fn new(
        mood: impl Into<String>,
        quote: impl Into<String>,
        author: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            mood: mood.into(),
            quote: quote.into(),
            author: author.into(),
            suggested_action: suggested_action.into(),
        }
    }

    /// Pretty JSON, as persisted by the `ask` command
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl RecordFields for StructuredRecord {
    fn field(&self, field: Field) -> Option<&str> {
        Some(match field {
            Field::Mood => &self.mood,
            Field::Quote => &self.quote,
            Field::Author => &self.author,
            Field::SuggestedAction => &self.suggested_action,
        })
    }
}

/// An entry of the quote database. Only `mood` and `quote` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub mood: String,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl QuoteEntry {
    pub fn new(mood: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            mood: mood.into(),
            quote: quote.into(),
            author: None,
            suggested_action: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.suggested_action = Some(action.into());
        self
    }
}

impl RecordFields for QuoteEntry {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Mood => Some(&self.mood),
            Field::Quote => Some(&self.quote),
            Field::Author => self.author.as_deref(),
            Field::SuggestedAction => self.suggested_action.as_deref(),
        }
    }
}

/// Expected values of a fixture sample; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl RecordFields for PartialRecord {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Mood => self.mood.as_deref(),
            Field::Quote => self.quote.as_deref(),
            Field::Author => self.author.as_deref(),
            Field::SuggestedAction => self.suggested_action.as_deref(),
        }
    }
}

impl From<QuoteEntry> for PartialRecord {
    fn from(entry: QuoteEntry) -> Self {
        Self {
            mood: Some(entry.mood),
            quote: Some(entry.quote),
            author: entry.author,
            suggested_action: entry.suggested_action,
        }
    }
}

impl From<StructuredRecord> for PartialRecord {
    fn from(record: StructuredRecord) -> Self {
        Self {
            mood: Some(record.mood),
            quote: Some(record.quote),
            author: Some(record.author),
            suggested_action: Some(record.suggested_action),
        }
    }
}
