//! moodquote - structured output recovery and scoring for mood-based quotes
//!
//! Two independent pieces:
//!
//! - [`ResponseExtractor`] turns noisy model text into a validated
//!   [`StructuredRecord`], retrying the model call a bounded number of times.
//! - [`score`] compares an expected record with an actual one using weighted
//!   fuzzy string similarity.
//!
//! A [`MockModel`] backed by a quote database stands in for a live model
//! during offline evaluation.
//!
//! # Example
//!
//! ```rust
//! use moodquote::{parse_and_validate, score, StructuredRecord};
//!
//! let reply = "Here you go:\n```json\n{\"mood\": \"tired\", \"quote\": \"Rest is part of the work.\", \
//!              \"author\": \"Unknown\", \"suggested_action\": \"Take a short nap.\"}\n```";
//! let record = parse_and_validate(reply).unwrap();
//!
//! let expected = StructuredRecord::new("tired", "Rest is part of the work.", "Unknown", "Take a nap.");
//! let report = score(&expected, &record);
//! assert!(report.overall_score > 0.9);
//! ```

pub mod extract;
pub mod fetch;
pub mod record;
pub mod scoring;
pub mod selection;
pub mod similarity;
pub mod tokens;

pub use extract::{
    extract_first_json_object, find_object, parse_and_validate, strip_fences, validate_object,
    ExtractionError, ExtractionStrategy, ObjectMatch, StrategyMatch,
};
pub use fetch::{
    fetch_structured, ExtractorConfig, FetchOutcome, ModelCaller, ResponseExtractor,
    DEFAULT_MAX_ATTEMPTS,
};
pub use record::{Field, PartialRecord, QuoteEntry, RecordFields, StructuredRecord};
pub use scoring::{score, score_weighted, ScoreReport, ScoreWeights};
pub use selection::{candidate_pool, fallback_entry, pick, MockModel, SamplingParams};
pub use similarity::string_similarity;
pub use tokens::{estimate_tokens, TokenLogging, TokenSource, TokenUsage};
