//! Offline and live evaluation over a labelled dataset

use async_trait::async_trait;
use moodquote::{
    score, FetchOutcome, MockModel, ModelCaller, PartialRecord, ResponseExtractor, SamplingParams,
    ScoreReport, TokenLogging,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dataset::{EvaluationSample, SampleId};
use crate::prompts::build_mood_prompt;

/// Why a sample produced no record
#[derive(Debug, Clone, PartialEq)]
pub enum SampleFailure {
    /// The model answered but no attempt yielded a valid record
    Extraction { reason: String, attempts: u32 },
    /// The model could not be reached
    Call { error: String },
}

/// Something that answers an evaluation input with a record
#[async_trait]
pub trait CandidateSource: Send {
    fn name(&self) -> &str;

    /// Sampling settings reported alongside the results
    fn params(&self) -> SamplingParams;

    async fn answer(&mut self, input: &str) -> Result<PartialRecord, SampleFailure>;
}

/// Answers from the quote database through [`MockModel`]
pub struct MockSource {
    model: MockModel,
    token_logging: TokenLogging,
}

impl MockSource {
    pub fn new(model: MockModel) -> Self {
        Self {
            model,
            token_logging: TokenLogging::default(),
        }
    }

    pub fn with_token_logging(mut self, token_logging: TokenLogging) -> Self {
        self.token_logging = token_logging;
        self
    }
}

#[async_trait]
impl CandidateSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn params(&self) -> SamplingParams {
        *self.model.params()
    }

    async fn answer(&mut self, input: &str) -> Result<PartialRecord, SampleFailure> {
        let params = *self.model.params();
        tracing::info!(
            "[Model call] temperature={:.2} top_k={:?} top_p={:?} input={}",
            params.temperature,
            params.top_k,
            params.top_p,
            input
        );
        let entry = self.model.respond(input);
        let reply = serde_json::to_string(&entry).unwrap_or_default();
        self.token_logging.log_estimate(input, &reply);
        Ok(entry.into())
    }
}

/// Answers from a live model through the structured-output extractor
pub struct LiveSource<C> {
    caller: C,
    extractor: ResponseExtractor,
    params: SamplingParams,
}

impl<C: ModelCaller> LiveSource<C> {
    pub fn new(caller: C, extractor: ResponseExtractor, params: SamplingParams) -> Self {
        Self {
            caller,
            extractor,
            params,
        }
    }
}

#[async_trait]
impl<C: ModelCaller> CandidateSource for LiveSource<C> {
    fn name(&self) -> &str {
        "live"
    }

    fn params(&self) -> SamplingParams {
        self.params
    }

    async fn answer(&mut self, input: &str) -> Result<PartialRecord, SampleFailure> {
        let prompt = build_mood_prompt(input);
        match self.extractor.fetch_structured(&prompt, &self.caller).await {
            Ok(FetchOutcome::Extracted { record, .. }) => Ok(record.into()),
            Ok(FetchOutcome::Exhausted { attempts, reason }) => Err(SampleFailure::Extraction {
                reason: reason.to_string(),
                attempts,
            }),
            Err(e) => Err(SampleFailure::Call {
                error: e.to_string(),
            }),
        }
    }
}

/// What happened to one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    Scored {
        actual: PartialRecord,
        scores: ScoreReport,
    },
    ExtractionFailed {
        reason: String,
        attempts: u32,
    },
    CallFailed {
        error: String,
    },
}

impl SampleOutcome {
    pub fn scores(&self) -> Option<&ScoreReport> {
        match self {
            SampleOutcome::Scored { scores, .. } => Some(scores),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.scores().is_none()
    }
}

/// Per-sample evaluation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SampleId>,
    pub input: String,
    pub expected: PartialRecord,
    #[serde(flatten)]
    pub outcome: SampleOutcome,
    pub latency_s: f64,
}

/// Aggregate over a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub num_samples: usize,
    pub num_scored: usize,
    pub num_failed: usize,
    /// Mean overall score of the scored samples; `None` when nothing scored
    pub average_overall_score: Option<f64>,
    pub average_latency_s: f64,
}

impl EvaluationSummary {
    pub fn from_results(results: &[SampleResult]) -> Self {
        let scored: Vec<f64> = results
            .iter()
            .filter_map(|r| r.outcome.scores())
            .map(|s| s.overall_score)
            .collect();
        let num_samples = results.len();
        let total_latency: f64 = results.iter().map(|r| r.latency_s).sum();

        Self {
            num_samples,
            num_scored: scored.len(),
            num_failed: num_samples - scored.len(),
            average_overall_score: if scored.is_empty() {
                None
            } else {
                Some(scored.iter().sum::<f64>() / scored.len() as f64)
            },
            average_latency_s: if num_samples == 0 {
                0.0
            } else {
                total_latency / num_samples as f64
            },
        }
    }
}

/// Results of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRun {
    pub source: String,
    pub params: SamplingParams,
    pub results: Vec<SampleResult>,
    pub summary: EvaluationSummary,
}

/// Runs a dataset through a candidate source, one sample at a time
pub struct Evaluator<S> {
    source: S,
}

impl<S: CandidateSource> Evaluator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&mut self, dataset: &[EvaluationSample]) -> EvaluationRun {
        let params = self.source.params();
        tracing::info!(
            "Running {} evaluation over {} samples (temperature={} top_k={:?} top_p={:?})",
            self.source.name(),
            dataset.len(),
            params.temperature,
            params.top_k,
            params.top_p
        );

        let mut results = Vec::with_capacity(dataset.len());
        for sample in dataset {
            let result = self.run_sample(sample).await;
            match &result.outcome {
                SampleOutcome::Scored { scores, .. } => tracing::info!(
                    " -> sample {} overall_score={:.3} time={:.3}s",
                    sample.label(),
                    scores.overall_score,
                    result.latency_s
                ),
                SampleOutcome::ExtractionFailed { reason, attempts } => tracing::warn!(
                    " -> sample {} extraction failed after {} attempt(s): {}",
                    sample.label(),
                    attempts,
                    reason
                ),
                SampleOutcome::CallFailed { error } => {
                    tracing::warn!(" -> sample {} model call failed: {}", sample.label(), error)
                }
            }
            results.push(result);
        }

        let summary = EvaluationSummary::from_results(&results);
        EvaluationRun {
            source: self.source.name().to_string(),
            params,
            results,
            summary,
        }
    }

    async fn run_sample(&mut self, sample: &EvaluationSample) -> SampleResult {
        let start = Instant::now();
        let answer = self.source.answer(&sample.input).await;
        let latency_s = start.elapsed().as_secs_f64();

        let outcome = match answer {
            Ok(actual) => {
                let scores = score(&sample.expected, &actual);
                SampleOutcome::Scored { actual, scores }
            }
            Err(SampleFailure::Extraction { reason, attempts }) => {
                SampleOutcome::ExtractionFailed { reason, attempts }
            }
            Err(SampleFailure::Call { error }) => SampleOutcome::CallFailed { error },
        };

        SampleResult {
            id: sample.id.clone(),
            input: sample.input.clone(),
            expected: sample.expected.clone(),
            outcome,
            latency_s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodquote::QuoteEntry;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quotes() -> Vec<QuoteEntry> {
        vec![
            QuoteEntry::new("tired", "Rest is part of the work.")
                .with_author("Unknown")
                .with_action("Take a short nap."),
            QuoteEntry::new("sad", "This too shall pass.").with_author("Persian proverb"),
        ]
    }

    fn dataset() -> Vec<EvaluationSample> {
        vec![
            EvaluationSample::new(
                "I feel so tired today",
                PartialRecord {
                    mood: Some("tired".to_string()),
                    quote: Some("Rest is part of the work.".to_string()),
                    author: Some("Unknown".to_string()),
                    suggested_action: Some("Take a short nap.".to_string()),
                },
            )
            .with_id(SampleId::Num(1)),
            EvaluationSample::new(
                "a bit sad",
                PartialRecord {
                    mood: Some("sad".to_string()),
                    ..Default::default()
                },
            )
            .with_id(SampleId::Num(2)),
        ]
    }

    /// Caller whose replies never contain a JSON object
    struct Rambling {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelCaller for Rambling {
        type Error = Infallible;

        async fn call(&self, _prompt: &str) -> Result<String, Self::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Sure! Here is a quote: be kind to yourself.".to_string())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    struct Unreachable;

    #[async_trait]
    impl ModelCaller for Unreachable {
        type Error = Refused;

        async fn call(&self, _prompt: &str) -> Result<String, Self::Error> {
            Err(Refused)
        }
    }

    #[tokio::test]
    async fn test_mock_evaluation_scores_matches() {
        let model = MockModel::new(quotes(), SamplingParams::default()).with_seed(7);
        let mut evaluator = Evaluator::new(MockSource::new(model).with_token_logging(TokenLogging::disabled()));

        let run = evaluator.run(&dataset()).await;

        assert_eq!(run.source, "mock");
        assert_eq!(run.summary.num_samples, 2);
        assert_eq!(run.summary.num_scored, 2);
        assert_eq!(run.summary.num_failed, 0);
        let first = run.results[0].outcome.scores().unwrap();
        assert!((first.overall_score - 1.0).abs() < 1e-12);
        assert!(run.summary.average_overall_score.is_some());
    }

    #[tokio::test]
    async fn test_failing_live_source_counts_failures_separately() {
        let caller = Rambling {
            calls: AtomicUsize::new(0),
        };
        let source = LiveSource::new(caller, ResponseExtractor::default(), SamplingParams::default());
        let mut evaluator = Evaluator::new(source);

        let run = evaluator.run(&dataset()).await;

        assert_eq!(run.summary.num_failed, 2);
        assert_eq!(run.summary.num_scored, 0);
        assert_eq!(run.summary.average_overall_score, None);
        assert!(matches!(
            run.results[0].outcome,
            SampleOutcome::ExtractionFailed { attempts: 2, .. }
        ));
        assert_eq!(evaluator.source().caller.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_unreachable_model_is_call_failure() {
        let source = LiveSource::new(Unreachable, ResponseExtractor::default(), SamplingParams::default());
        let mut evaluator = Evaluator::new(source);

        let run = evaluator.run(&dataset()[..1]).await;
        match &run.results[0].outcome {
            SampleOutcome::CallFailed { error } => assert_eq!(error, "connection refused"),
            other => panic!("expected call failure, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_averages_scored_samples_only() {
        let scored = |overall: f64| SampleResult {
            id: None,
            input: "x".to_string(),
            expected: PartialRecord::default(),
            outcome: SampleOutcome::Scored {
                actual: PartialRecord::default(),
                scores: ScoreReport {
                    mood_score: overall,
                    quote_score: overall,
                    author_score: overall,
                    action_score: overall,
                    overall_score: overall,
                },
            },
            latency_s: 1.0,
        };
        let failed = SampleResult {
            outcome: SampleOutcome::ExtractionFailed {
                reason: "no JSON object found".to_string(),
                attempts: 2,
            },
            latency_s: 4.0,
            ..scored(0.0)
        };

        let summary = EvaluationSummary::from_results(&[scored(0.5), scored(1.0), failed]);
        assert_eq!(summary.num_failed, 1);
        assert_eq!(summary.average_overall_score, Some(0.75));
        assert_eq!(summary.average_latency_s, 2.0);
    }

    #[test]
    fn test_sample_result_json_is_flat() {
        let result = SampleResult {
            id: Some(SampleId::Text("a".to_string())),
            input: "tired".to_string(),
            expected: PartialRecord::default(),
            outcome: SampleOutcome::CallFailed {
                error: "timeout".to_string(),
            },
            latency_s: 0.5,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "call_failed");
        assert_eq!(value["error"], "timeout");
        assert_eq!(value["id"], "a");
    }
}
