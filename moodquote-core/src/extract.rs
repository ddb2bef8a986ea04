//! Recovery of structured records from free-form model output
//!
//! Model replies arrive wrapped in markdown fences, surrounded by prose, or cut
//! off mid-object. Recovery runs a fixed, ordered list of extraction strategies
//! and then validates the first JSON object found against the four-field
//! record contract.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::record::{Field, StructuredRecord};

/// Longest slice of raw text echoed back in a parse error message
const RAW_PREVIEW_CHARS: usize = 200;

/// Why a model reply could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// No JSON object could be recovered (no `{`, or the object never closes)
    #[error("no JSON object found in model output: {}", preview(.raw))]
    Parse { raw: String },

    /// An object was recovered but a required field is unusable
    #[error("field `{key}` is missing or not a non-empty string")]
    Validation { key: Field },
}

impl ExtractionError {
    pub fn is_parse(&self) -> bool {
        matches!(self, ExtractionError::Parse { .. })
    }

    /// The offending field, for validation failures
    pub fn key(&self) -> Option<Field> {
        match self {
            ExtractionError::Validation { key } => Some(*key),
            ExtractionError::Parse { .. } => None,
        }
    }
}

fn preview(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(RAW_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn leading_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^```[a-z0-9_+\-]*[ \t]*(?:\r?\n)?").unwrap())
}

fn trailing_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\r?\n)?[ \t]*```$").unwrap())
}

/// Remove a leading ```` ```lang ```` marker and a trailing ```` ``` ````.
///
/// Only the two ends are touched; text without fences comes back trimmed.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let start = leading_fence().find(trimmed).map(|m| m.end()).unwrap_or(0);
    let rest = &trimmed[start..];
    let end = trailing_fence().find(rest).map(|m| m.start()).unwrap_or(rest.len());
    rest[..end].trim()
}

/// Slice from the first `{` through the brace that closes it.
///
/// Returns `None` when there is no `{` or the object is never closed.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;

    // `{` and `}` are ASCII, so byte offsets are always char boundaries
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// A way of locating a JSON object in fence-stripped model output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The whole text is the object
    WholeText,
    /// The first balanced `{...}` span inside the text
    FirstObject,
}

impl ExtractionStrategy {
    /// Strategies in the order they are tried
    pub const ORDER: [ExtractionStrategy; 2] =
        [ExtractionStrategy::WholeText, ExtractionStrategy::FirstObject];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::WholeText => "whole_text",
            ExtractionStrategy::FirstObject => "first_object",
        }
    }

    /// Apply this strategy to fence-stripped text
    pub fn apply(&self, text: &str) -> StrategyMatch {
        let candidate = match self {
            ExtractionStrategy::WholeText => text,
            ExtractionStrategy::FirstObject => match extract_first_json_object(text) {
                Some(span) => span,
                None => return StrategyMatch::NoMatch,
            },
        };
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => StrategyMatch::Object(object),
            Ok(_) => StrategyMatch::NotAnObject,
            Err(_) => StrategyMatch::NoMatch,
        }
    }
}

/// What a single strategy found
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyMatch {
    Object(Map<String, Value>),
    /// Valid JSON, but not an object; ends the search
    NotAnObject,
    /// Nothing usable; the next strategy is tried
    NoMatch,
}

/// A JSON object located by one of the strategies
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMatch {
    pub strategy: ExtractionStrategy,
    pub object: Map<String, Value>,
}

/// Run the strategies in order and return the first object found.
///
/// Text that is valid JSON but not an object yields `None` without trying
/// later strategies, so a record wrapped in an array is rejected.
pub fn find_object(text: &str) -> Option<ObjectMatch> {
    for strategy in ExtractionStrategy::ORDER {
        match strategy.apply(text) {
            StrategyMatch::Object(object) => return Some(ObjectMatch { strategy, object }),
            StrategyMatch::NotAnObject => {
                tracing::debug!("{} parsed to a non-object JSON value", strategy.name());
                return None;
            }
            StrategyMatch::NoMatch => {}
        }
    }
    None
}

/// Check the record contract, failing on the first bad field in canonical order
pub fn validate_object(object: &Map<String, Value>) -> Result<StructuredRecord, ExtractionError> {
    Ok(StructuredRecord {
        mood: required(object, Field::Mood)?,
        quote: required(object, Field::Quote)?,
        author: required(object, Field::Author)?,
        suggested_action: required(object, Field::SuggestedAction)?,
    })
}

fn required(object: &Map<String, Value>, field: Field) -> Result<String, ExtractionError> {
    match object.get(field.key()) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        _ => Err(ExtractionError::Validation { key: field }),
    }
}

/// Turn raw model output into a validated record
pub fn parse_and_validate(text: &str) -> Result<StructuredRecord, ExtractionError> {
    let stripped = strip_fences(text);

    let found = find_object(stripped).ok_or_else(|| ExtractionError::Parse {
        raw: text.to_string(),
    })?;
    tracing::debug!("Recovered JSON object via {}", found.strategy.name());

    validate_object(&found.object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_language_tag() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```JSON\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
    }

    #[test]
    fn test_strip_fences_without_fences() {
        assert_eq!(strip_fences("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(strip_fences("plain text"), "plain text");
    }

    #[test]
    fn test_strip_fences_keeps_interior() {
        let text = "```json\n{\"quote\":\"use ``` sparingly\"}\n```";
        assert_eq!(strip_fences(text), "{\"quote\":\"use ``` sparingly\"}");
    }

    #[test]
    fn test_extract_first_object_with_prose() {
        let text = r#"foo {"mood":"tired","quote":"x","author":"y","suggested_action":"z"} bar"#;
        assert_eq!(
            extract_first_json_object(text),
            Some(r#"{"mood":"tired","quote":"x","author":"y","suggested_action":"z"}"#)
        );
    }

    #[test]
    fn test_extract_nested_object() {
        let text = r#"reply: {"a": {"b": {}}, "c": 1} {"second": true}"#;
        assert_eq!(extract_first_json_object(text), Some(r#"{"a": {"b": {}}, "c": 1}"#));
    }

    #[test]
    fn test_extract_unterminated_or_missing() {
        assert_eq!(extract_first_json_object(r#"{"mood":"tired""#), None);
        assert_eq!(extract_first_json_object("no braces here"), None);
        assert_eq!(extract_first_json_object("closing only }"), None);
    }

    #[test]
    fn test_strategy_order() {
        let whole = find_object(r#"{"mood":"x"}"#).unwrap();
        assert_eq!(whole.strategy, ExtractionStrategy::WholeText);

        let inner = find_object(r#"Sure! {"mood":"x"}"#).unwrap();
        assert_eq!(inner.strategy, ExtractionStrategy::FirstObject);

        assert!(find_object("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_array_wrapped_record_is_parse_error() {
        let text = r#"[{"mood":"tired","quote":"x","author":"y","suggested_action":"z"}]"#;
        assert_eq!(ExtractionStrategy::WholeText.apply(text), StrategyMatch::NotAnObject);

        let err = parse_and_validate(text).unwrap_err();
        assert!(err.is_parse());

        let fenced = format!("```json\n{}\n```", text);
        assert!(parse_and_validate(&fenced).unwrap_err().is_parse());
    }

    #[test]
    fn test_non_object_scalars_are_parse_errors() {
        for text in ["null", "42", "\"{\\\"mood\\\":1}\""] {
            assert!(parse_and_validate(text).unwrap_err().is_parse(), "{}", text);
        }
    }

    #[test]
    fn test_validation_reports_first_bad_field() {
        let object = serde_json::json!({"mood": "tired", "quote": "  ", "author": 3});
        let err = validate_object(object.as_object().unwrap()).unwrap_err();
        assert_eq!(err, ExtractionError::Validation { key: Field::Quote });
    }

    #[test]
    fn test_parse_error_preview_is_bounded() {
        let raw = "x".repeat(500);
        let err = parse_and_validate(&raw).unwrap_err();
        assert!(err.is_parse());
        let message = err.to_string();
        assert!(message.ends_with("..."));
        assert!(message.len() < 300);
    }
}
