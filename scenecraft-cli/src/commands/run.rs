//! Run command handler
//!
//! Runs the full generate, render and repair pipeline for one prompt and
//! prints each stage as it happens.

use anyhow::{Context, Result};
use colored::*;
use scenecraft_client::{ChatClient, ChatConfig};
use scenecraft_core::domain::Request;
use scenecraft_pipeline::{
    CodeGenerationService, Pipeline, PipelineObserver, PipelineReport, PipelineState, Stage,
};
use scenecraft_runner::RenderBackend;
use std::sync::Arc;

use super::print_outcome;
use crate::config::Config;

/// Prints stage transitions to the terminal
struct ConsoleObserver {
    max_retries: u32,
}

impl PipelineObserver for ConsoleObserver {
    fn on_stage(&self, state: &PipelineState) {
        if let Some(line) = stage_line(state, self.max_retries) {
            println!("{}", line);
        }
    }
}

/// One progress line per non-terminal stage
fn stage_line(state: &PipelineState, max_retries: u32) -> Option<String> {
    let line = match state.stage {
        Stage::Refining => format!("{} Refining request", "→".cyan()),
        Stage::Generating => format!("{} Generating scene code", "→".cyan()),
        Stage::Executing if state.retries == 0 => format!("{} Rendering", "→".cyan()),
        Stage::Executing => format!(
            "{} Rendering (attempt {})",
            "→".cyan(),
            state.retries + 1
        ),
        Stage::Fixing => format!(
            "{} Render failed, repairing code ({}/{})",
            "↻".yellow(),
            state.retries + 1,
            max_retries
        ),
        Stage::Succeeded | Stage::Failed => return None,
    };
    Some(line)
}

/// Run the pipeline for a prompt
pub async fn run_pipeline(
    config: Config,
    prompt: String,
    max_retries: u32,
    show_code: bool,
) -> Result<()> {
    let chat_config = ChatConfig::from_env().context("Language model is not configured")?;
    let model = Arc::new(ChatClient::new(chat_config)?);
    tracing::debug!(model = model.model(), max_retries, "Starting pipeline");
    let generator = Arc::new(CodeGenerationService::new(model));
    let backend = Arc::new(RenderBackend::new(config.runner)?);

    let pipeline = Pipeline::new(generator, backend, max_retries)
        .with_observer(Arc::new(ConsoleObserver { max_retries }));

    let request = Request::new(prompt);
    let report = tokio::task::spawn_blocking(move || pipeline.run(request))
        .await
        .context("Pipeline task panicked")??;

    print_report(&report, show_code);

    if !report.succeeded() {
        anyhow::bail!(
            "no working animation after {} repair attempt(s)",
            report.retries
        );
    }

    Ok(())
}

fn print_report(report: &PipelineReport, show_code: bool) {
    println!();
    print_outcome(&report.outcome);
    let summary = report.refined.description.lines().next().unwrap_or_default();
    println!("  Request: {}", summary.dimmed());
    println!("  Scene:   {}", report.artifact.scene_or_default().bold());
    println!("  Repairs: {}", report.retries.to_string().dimmed());

    if show_code {
        println!();
        println!("{}", "Final script:".bold());
        println!("{}", report.artifact.code);
    }
}
