//! Results reporting

use chrono::{DateTime, Utc};
use moodquote::{SamplingParams, StructuredRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runner::{EvaluationRun, EvaluationSummary, SampleOutcome, SampleResult};

/// Run id format, also the name of the run's output directory
pub const RUN_ID_FORMAT: &str = "%Y%m%d-%H%M%S";

/// File name of the report inside a run directory
pub const REPORT_FILE: &str = "evaluation.json";

pub fn run_id(started_at: DateTime<Utc>) -> String {
    started_at.format(RUN_ID_FORMAT).to_string()
}

/// JSON evaluation export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: String,
    pub timestamp: String,
    pub source: String,
    pub params: SamplingParams,
    pub summary: EvaluationSummary,
    pub results: Vec<SampleResult>,
}

impl EvaluationReport {
    pub fn from_run(run_id: impl Into<String>, run: &EvaluationRun) -> Self {
        Self {
            run_id: run_id.into(),
            timestamp: Utc::now().to_rfc3339(),
            source: run.source.clone(),
            params: run.params,
            summary: run.summary.clone(),
            results: run.results.clone(),
        }
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Write to `<output_dir>/<run_id>/evaluation.json`, returning the file path
    pub fn save(&self, output_dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let run_dir = output_dir.as_ref().join(&self.run_id);
        std::fs::create_dir_all(&run_dir)?;
        let path = run_dir.join(REPORT_FILE);
        self.write_to_file(&path)?;
        Ok(path)
    }
}

/// Persist a validated record as pretty JSON
pub fn write_record(path: impl AsRef<Path>, record: &StructuredRecord) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = record
        .to_pretty_json()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}

fn sample_line(result: &SampleResult) -> String {
    let id = result
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    match &result.outcome {
        SampleOutcome::Scored { scores, .. } => format!(
            "  {:<8} overall={:.3} mood={:.2} quote={:.2} author={:.2} action={:.2} ({:.3}s)",
            id,
            scores.overall_score,
            scores.mood_score,
            scores.quote_score,
            scores.author_score,
            scores.action_score,
            result.latency_s
        ),
        SampleOutcome::ExtractionFailed { reason, attempts } => format!(
            "  {:<8} EXTRACTION FAILED after {} attempt(s): {}",
            id, attempts, reason
        ),
        SampleOutcome::CallFailed { error } => format!("  {:<8} CALL FAILED: {}", id, error),
    }
}

/// Generate a console report
pub fn print_console_report(run: &EvaluationRun) {
    println!("\n=== Evaluation Results ({}) ===\n", run.source);
    println!(
        "temperature={} top_k={:?} top_p={:?}\n",
        run.params.temperature, run.params.top_k, run.params.top_p
    );

    println!("Samples:");
    println!("{:-<50}", "");
    for result in &run.results {
        println!("{}", sample_line(result));
    }

    let summary = &run.summary;
    println!("\n=== EVALUATION SUMMARY ===");
    println!("Samples: {}", summary.num_samples);
    println!("Scored: {}", summary.num_scored);
    println!("Failed: {}", summary.num_failed);
    match summary.average_overall_score {
        Some(avg) => println!("Average overall score: {:.3}", avg),
        None => println!("Average overall score: n/a"),
    }
    println!("Average latency (s): {:.3}", summary.average_latency_s);
    println!("\n{:=<50}", "");
}
