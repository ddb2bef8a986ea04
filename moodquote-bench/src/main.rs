//! moodquote CLI

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moodquote::{FetchOutcome, MockModel, ResponseExtractor};
use moodquote_bench::{
    config::{Config, GenerationConfig},
    dataset::{load_dataset, load_quotes},
    prompts::build_mood_prompt,
    providers::create_caller_with_config,
    reporting::{print_console_report, run_id, write_record, EvaluationReport},
    runner::{Evaluator, LiveSource, MockSource},
};

#[derive(Parser)]
#[command(name = "moodquote")]
#[command(about = "Mood-based motivational quotes with structured output recovery and scoring")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Sampling overrides shared by `ask` and `evaluate`
#[derive(clap::Args)]
struct SamplingArgs {
    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Top-K candidate limit
    #[arg(long)]
    top_k: Option<u32>,

    /// Top-P (nucleus) fraction
    #[arg(long)]
    top_p: Option<f32>,
}

impl SamplingArgs {
    fn apply(&self, generation: &mut GenerationConfig) {
        if let Some(temperature) = self.temperature {
            generation.temperature = temperature;
        }
        if self.top_k.is_some() {
            generation.top_k = self.top_k;
        }
        if self.top_p.is_some() {
            generation.top_p = self.top_p;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a live model for a quote matching a mood
    Ask {
        /// Mood to ask about
        #[arg(short, long)]
        mood: String,

        /// Provider to call
        #[arg(short, long, default_value = "gemini")]
        provider: String,

        #[command(flatten)]
        sampling: SamplingArgs,

        /// Where to write the validated record
        #[arg(short, long, default_value = "last_response.json")]
        output: PathBuf,
    },

    /// Score a model against a labelled dataset
    Evaluate {
        /// Dataset JSON file
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Quote database JSON file (mock model)
        #[arg(short, long)]
        quotes: Option<PathBuf>,

        #[command(flatten)]
        sampling: SamplingArgs,

        /// Seed for the mock model
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Call the live provider instead of the mock model
        #[arg(long)]
        live: bool,

        /// Provider used with --live
        #[arg(short, long, default_value = "gemini")]
        provider: String,
    },

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/moodquote.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("moodquote=debug,moodquote_bench=debug,info")
    } else {
        EnvFilter::new("moodquote=info,moodquote_bench=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Commands::Ask {
            mood,
            provider,
            sampling,
            output,
        } => {
            ask(config, &mood, &provider, sampling, output).await?;
        }

        Commands::Evaluate {
            dataset,
            quotes,
            sampling,
            seed,
            output,
            live,
            provider,
        } => {
            evaluate(config, dataset, quotes, sampling, seed, output, live, &provider).await?;
        }

        Commands::InitConfig { output } => {
            init_config(output)?;
        }
    }

    Ok(())
}

async fn ask(
    mut config: Config,
    mood: &str,
    provider: &str,
    sampling: SamplingArgs,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    sampling.apply(&mut config.generation);

    let caller = create_caller_with_config(provider, &config)?;
    let extractor = ResponseExtractor::new(config.extraction.extractor_config());
    let prompt = build_mood_prompt(mood);

    match extractor.fetch_structured(&prompt, &caller).await? {
        FetchOutcome::Extracted { record, attempts } => {
            tracing::debug!("Record extracted on attempt {}", attempts);
            println!("Model Output:\n{}", record.to_pretty_json()?);
            write_record(&output, &record)?;
            println!("Saved to: {}", output.display());
            Ok(())
        }
        FetchOutcome::Exhausted { attempts, reason } => {
            eprintln!(
                "Error: no valid structured reply after {} attempt(s): {}",
                attempts, reason
            );
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn evaluate(
    mut config: Config,
    dataset_path: Option<PathBuf>,
    quotes_path: Option<PathBuf>,
    sampling: SamplingArgs,
    seed: Option<u64>,
    output: Option<PathBuf>,
    live: bool,
    provider: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    sampling.apply(&mut config.generation);
    let params = config.generation.sampling_params();

    let dataset_path =
        dataset_path.unwrap_or_else(|| PathBuf::from(&config.evaluation.dataset_file));
    let dataset = load_dataset(&dataset_path)?;

    let started_at = Utc::now();
    let run_id = run_id(started_at);
    println!("Run ID: {}", run_id);

    let run = if live {
        let caller = create_caller_with_config(provider, &config)?;
        let extractor = ResponseExtractor::new(config.extraction.extractor_config());
        let mut evaluator = Evaluator::new(LiveSource::new(caller, extractor, params));
        evaluator.run(&dataset).await
    } else {
        let quotes_path =
            quotes_path.unwrap_or_else(|| PathBuf::from(&config.evaluation.quotes_file));
        let quotes = load_quotes(&quotes_path)?;

        let mut model = MockModel::new(quotes, params);
        if let Some(seed) = seed.or(config.evaluation.seed) {
            model = model.with_seed(seed);
        }
        let source = MockSource::new(model).with_token_logging(config.tokens);
        let mut evaluator = Evaluator::new(source);
        evaluator.run(&dataset).await
    };

    print_console_report(&run);

    let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.evaluation.output_dir));
    let report = EvaluationReport::from_run(&run_id, &run);
    let path = report.save(&output_dir)?;
    println!("Results written to: {}", path.display());

    Ok(())
}

fn init_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    // Ensure parent directory exists
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    config.save_toml(&output)?;
    println!("Configuration written to: {}", output.display());
    Ok(())
}
