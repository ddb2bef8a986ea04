//! Evaluation engine

pub mod evaluator;
pub mod rate_limiter;

pub use evaluator::{
    CandidateSource, EvaluationRun, EvaluationSummary, Evaluator, LiveSource, MockSource,
    SampleFailure, SampleOutcome, SampleResult,
};
pub use rate_limiter::RateLimiter;
