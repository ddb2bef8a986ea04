//! Live model calls and offline evaluation for moodquote
//!
//! This crate wires the `moodquote` core to the outside world: a Gemini
//! client behind the [`providers::LLMProvider`] trait, TOML configuration,
//! dataset loading, the evaluation runner and JSON/console reporting.
//!
//! # Example
//!
//! ```no_run
//! use moodquote::{MockModel, QuoteEntry, SamplingParams};
//! use moodquote_bench::{
//!     dataset::load_dataset,
//!     runner::{Evaluator, MockSource},
//!     reporting::print_console_report,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let dataset = load_dataset("evaluation_dataset.json").unwrap();
//!     let quotes = vec![QuoteEntry::new("tired", "Rest is part of the work.")];
//!
//!     let model = MockModel::new(quotes, SamplingParams::default()).with_seed(42);
//!     let mut evaluator = Evaluator::new(MockSource::new(model));
//!
//!     let run = evaluator.run(&dataset).await;
//!     print_console_report(&run);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod prompts;
pub mod providers;
pub mod reporting;
pub mod runner;

pub use config::Config;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{Config, GenerationConfig};
    pub use crate::dataset::{load_dataset, load_quotes, EvaluationSample, SampleId};
    pub use crate::prompts::build_mood_prompt;
    pub use crate::providers::{
        canonical_provider_name, create_caller_with_config, create_provider_with_config,
        CompletionRequest,
        CompletionResponse, LLMProvider, ProviderCaller, ProviderError, ProviderResult,
    };
    pub use crate::reporting::{print_console_report, write_record, EvaluationReport};
    pub use crate::runner::{
        CandidateSource, EvaluationRun, EvaluationSummary, Evaluator, LiveSource, MockSource,
        SampleOutcome,
    };
}
