//! Command-line surface for the two pipelines.
//!
//! Both commands drive the same interactive loop: run the pipeline, print
//! the interrupt prompt whenever a stage suspends, read one line of operator
//! input, resume, and repeat until the run completes. Checkpoints live under
//! the output directory, so a suspended run survives the process.

use crate::checkpoint::FileCheckpointStore;
use crate::errors::SpecforgeError;
use crate::events::LoggingEventSink;
use crate::mockup::{ChromiumRasterizer, MockupAssembler, MockupState};
use crate::pipeline::{Executor, RunOutcome, RunToken};
use crate::prd::{PrdAssembler, PrdState};
use crate::provider::{OpenAiProvider, ProviderConfig};
use crate::state::PipelineState;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "specforge", version, about = "Turn requirements into PRDs and UI mockups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a structured PRD from a free-text requirement
    Prd {
        /// The requirement to expand
        #[arg(short, long)]
        input: String,

        /// Target implementation language (skips the language question)
        #[arg(short, long)]
        language: Option<String>,

        /// Model override (otherwise LLM_MODEL, then the built-in default)
        #[arg(long)]
        model: Option<String>,

        /// Temperature override (otherwise LLM_TEMPERATURE, then the default)
        #[arg(long)]
        temperature: Option<f32>,

        /// Directory receiving run outputs and checkpoints
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },

    /// Render a UI mockup from an existing PRD document
    Mockup {
        /// Path to the PRD markdown or text file
        #[arg(long)]
        prd_file: PathBuf,

        /// Pre-answer the style question (a-e or a preset name)
        #[arg(long)]
        style: Option<String>,

        /// Directory receiving run outputs and checkpoints
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
    },
}

/// Parses arguments and runs the selected pipeline to completion.
///
/// # Errors
///
/// Surfaces pipeline, provider, and filesystem failures to the shell.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Prd {
            input,
            language,
            model,
            temperature,
            output_dir,
        } => run_prd(input, language, model, temperature, output_dir).await,
        Commands::Mockup {
            prd_file,
            style,
            output_dir,
        } => run_mockup(prd_file, style, output_dir).await,
    }
}

async fn run_prd(
    input: String,
    language: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    let config = ProviderConfig::from_env().with_overrides(model, temperature);
    let provider = Arc::new(OpenAiProvider::new(config)?);
    let pipeline = crate::prd::build_pipeline(provider)?;

    let store = Arc::new(FileCheckpointStore::new(output_dir.join(".checkpoints")));
    let executor = Executor::new(pipeline, store).with_events(Arc::new(LoggingEventSink));

    let token = RunToken::new();
    let state = drive(
        &executor,
        token,
        PrdState::from_requirement(input, language),
        None,
    )
    .await?;

    let path = output_dir.join(token.to_string()).join("prd.md");
    PrdAssembler::assemble(&state).write_to(&path)?;

    println!("PRD written to {}", path.display());
    if !state.project_name.is_empty() {
        println!("Project: {}", state.project_name);
    }
    Ok(())
}

async fn run_mockup(
    prd_file: PathBuf,
    style: Option<String>,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    let prd_text = std::fs::read_to_string(&prd_file)
        .with_context(|| format!("cannot read PRD file {}", prd_file.display()))?;

    let pipeline = crate::mockup::build_pipeline(Arc::new(ChromiumRasterizer::new()))?;
    let store = Arc::new(FileCheckpointStore::new(output_dir.join(".checkpoints")));
    let executor = Executor::new(pipeline, store).with_events(Arc::new(LoggingEventSink));

    let token = RunToken::new();
    let state = drive(&executor, token, MockupState::from_prd_text(prd_text), style).await?;

    let artifact = MockupAssembler::assemble(&state)?;
    let paths = artifact.write_to(&output_dir.join(token.to_string()))?;

    println!("Mockup written to {}", paths.image.display());
    println!("Markup: {}", paths.html.display());
    println!("Sidecar: {}", paths.sidecar.display());
    Ok(())
}

/// Runs a pipeline, answering interrupts from `preset_answer` first and the
/// operator's terminal afterwards, until the run completes.
async fn drive<S: PipelineState>(
    executor: &Executor<S>,
    token: RunToken,
    initial: S,
    mut preset_answer: Option<String>,
) -> Result<S, anyhow::Error> {
    let mut outcome = executor.run_with_token(token, initial).await?;
    loop {
        match outcome {
            RunOutcome::Complete(state) => return Ok(state),
            RunOutcome::Suspended { token, payload } => {
                let answer = match preset_answer.take() {
                    Some(answer) => answer,
                    None => prompt_operator(&payload.render())?,
                };
                outcome = executor
                    .resume(token, serde_json::Value::String(answer))
                    .await
                    .map_err(annotate_resume)?;
            }
        }
    }
}

fn annotate_resume(err: SpecforgeError) -> anyhow::Error {
    match err {
        SpecforgeError::CheckpointNotFound { token } => anyhow::anyhow!(
            "run {token} has no checkpoint; it may have been swept or never suspended"
        ),
        other => other.into(),
    }
}

fn prompt_operator(prompt: &str) -> anyhow::Result<String> {
    println!("\n{prompt}");
    print!("> ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}
