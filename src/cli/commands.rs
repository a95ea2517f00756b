//! CLI command definitions for lesson_forge.
//!
//! One command, `generate`, runs the generate/review pipeline for a single
//! grade and topic, prints the progress of each stage and optionally writes
//! the result to disk.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use crate::content::GeneratedContent;
use crate::export::ResultExporter;
use crate::pipeline::{
    AttemptOutput, PipelineAttempt, PipelineConfig, PipelineFailure, PipelineOrchestrator,
    PipelineResult,
};

/// Grade-aware lesson and quiz generator with an LLM review pass.
#[derive(Parser)]
#[command(name = "lesson-forge")]
#[command(about = "Generate grade-appropriate lessons and MCQs with an LLM reviewer")]
#[command(version)]
#[command(
    long_about = "lesson-forge asks an LLM for an explanation and multiple choice questions on a topic,\nhas a second LLM pass review them, and refines the lesson once if the review fails.\n\nExample usage:\n  lesson-forge generate --grade 4 --topic \"Types of angles\" --output ./lessons"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate and review a lesson for one grade and topic.
    #[command(alias = "gen")]
    Generate(GenerateArgs),
}

/// Arguments for the generate command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Grade level of the students (1 or higher).
    #[arg(short = 'g', long)]
    pub grade: u32,

    /// Topic to teach.
    #[arg(short = 't', long)]
    pub topic: String,

    /// Model used by both the generator and the reviewer.
    ///
    /// Defaults to PIPELINE_MODEL, then llama-3.3-70b-versatile.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// API key (can also be set via the GROQ_API_KEY env var).
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Directory to write the final content and full result JSON files to.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Output the full result as JSON to stdout instead of a readable summary.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Abort the whole run after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the lesson-forge CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => {
            run_generate_command(args).await?;
        }
    }
    Ok(())
}

// ============================================================================
// Generate Command Implementation
// ============================================================================

/// JSON printed to stdout with `--json` when a run aborts.
#[derive(Debug, Serialize)]
struct FailureOutput<'a> {
    status: &'static str,
    stage: Option<String>,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_output: Option<&'a str>,
    attempts: &'a [PipelineAttempt],
}

/// Layers command-line overrides on top of the environment configuration.
fn build_config(args: &GenerateArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env_optional()
        .context("Failed to read pipeline configuration from the environment")?;

    if let Some(key) = &args.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(base) = &args.api_base {
        config = config.with_api_base(base.clone());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }

    config.validate().context(
        "Invalid pipeline configuration. Please provide --api-key or set the GROQ_API_KEY env var",
    )?;
    Ok(config)
}

async fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let orchestrator = PipelineOrchestrator::from_config(&config)
        .context("Failed to initialize the completion client")?;

    if !args.json {
        println!("\n📚 Lesson Generation");
        println!("====================");
        println!("Grade: {}", args.grade);
        println!("Topic: {}", args.topic.trim());
        println!("Model: {}", config.model);
        println!();
    }

    let start = std::time::Instant::now();
    let outcome = match args.timeout_secs {
        Some(secs) => tokio::time::timeout(
            Duration::from_secs(secs),
            orchestrator.run(args.grade, &args.topic),
        )
        .await
        .map_err(|_| anyhow::anyhow!("Pipeline timed out after {}s", secs))?,
        None => orchestrator.run(args.grade, &args.topic).await,
    };

    let result = match outcome {
        Ok(result) => result,
        Err(failure) => {
            report_failure(&failure, args.json)?;
            return Err(anyhow::Error::new(failure).context("Lesson generation failed"));
        }
    };

    info!(
        final_status = %result.final_status,
        refined = result.refined,
        duration_ms = start.elapsed().as_millis() as u64,
        "Lesson generation finished"
    );

    if args.json {
        let json_output = serde_json::to_string_pretty(&result)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json_output);
    } else {
        print_summary(&result);
    }

    if let Some(dir) = &args.output {
        let files = ResultExporter::new(dir)
            .export(&result)
            .with_context(|| format!("Failed to export results to {}", dir))?;
        if !args.json {
            println!("💾 Saved {}", files.content_path.display());
            println!("💾 Saved {}", files.results_path.display());
        }
    }

    Ok(())
}

fn report_failure(failure: &PipelineFailure, json: bool) -> anyhow::Result<()> {
    warn!(
        stage = ?failure.stage(),
        attempts = failure.attempts.len(),
        "Pipeline aborted"
    );

    if json {
        let output = FailureOutput {
            status: "failed",
            stage: failure.stage().map(|s| s.to_string()),
            error: failure.error.to_string(),
            raw_output: failure.error.raw_output(),
            attempts: &failure.attempts,
        };
        let json_output = serde_json::to_string_pretty(&output)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json_output);
        return Ok(());
    }

    if !failure.attempts.is_empty() {
        println!("Attempts before the failure:");
        for attempt in &failure.attempts {
            println!("{}", format_attempt(attempt));
        }
        println!();
    }
    if let Some(raw) = failure.error.raw_output() {
        println!("Raw model output:\n{}\n", raw);
    }
    Ok(())
}

/// One progress line for an attempt, plus indented feedback lines for a failed review.
fn format_attempt(attempt: &PipelineAttempt) -> String {
    let position = attempt.sequence + 1;
    match &attempt.output {
        AttemptOutput::Content(content) => format!(
            "📝 [{}] {}: {} questions",
            position,
            attempt.stage,
            content.question_count()
        ),
        AttemptOutput::Verdict(verdict) => {
            let icon = if verdict.is_pass() { "✓" } else { "✗" };
            let mut line = format!("{} [{}] {}: {}", icon, position, attempt.stage, verdict.status);
            for item in &verdict.feedback {
                line.push_str(&format!("\n     - {}", item));
            }
            line
        }
    }
}

fn format_content(content: &GeneratedContent) -> String {
    let mut out = String::new();
    out.push_str(&content.explanation);
    out.push('\n');

    for (idx, mcq) in content.mcqs.iter().enumerate() {
        out.push_str(&format!("\nQ{}. {}\n", idx + 1, mcq.question));
        for (letter, option) in ['A', 'B', 'C', 'D'].iter().zip(mcq.options.iter()) {
            let marker = if *option == mcq.answer { " ✓" } else { "" };
            out.push_str(&format!("   {}) {}{}\n", letter, option, marker));
        }
    }
    out
}

fn print_summary(result: &PipelineResult) {
    for attempt in &result.attempts {
        println!("{}", format_attempt(attempt));
    }

    println!("\n{}", "=".repeat(50));
    println!(
        "📊 Final status: {}{}",
        result.final_status,
        if result.refined { " (refined once)" } else { "" }
    );
    println!("{}", "=".repeat(50));
    println!("{}", format_content(&result.final_output));
}
