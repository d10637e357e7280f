//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod render;
mod run;
mod validate;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use scenecraft_core::domain::ExecutionOutcome;

use crate::config::Config;

/// Lines of error output shown for a failed render
const ERROR_TAIL_LINES: usize = 15;

/// Top-level CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, render and repair an animation from a prompt
    Run {
        /// Animation request in plain language
        prompt: String,

        /// Maximum number of repair attempts
        #[arg(long, env = "MAX_RETRIES", default_value = "3")]
        max_retries: u32,

        /// Print the final script
        #[arg(long)]
        show_code: bool,
    },
    /// Check a script against the safety policy
    Validate {
        /// Path to a Python script
        file: String,
    },
    /// Render a script once, without repairs
    Render {
        /// Path to a Python script
        file: String,

        /// Scene class to render (default: first scene class in the file)
        #[arg(short, long)]
        scene: Option<String>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Run {
            prompt,
            max_retries,
            show_code,
        } => run::run_pipeline(config, prompt, max_retries, show_code).await,
        Commands::Validate { file } => validate::validate_file(&file),
        Commands::Render { file, scene } => render::render_file(config, &file, scene).await,
    }
}

/// Read a script file
fn read_script(path: &str) -> Result<String> {
    use anyhow::Context;

    std::fs::read_to_string(path).with_context(|| format!("Failed to read script file: {}", path))
}

/// Print an execution outcome
fn print_outcome(outcome: &ExecutionOutcome) {
    match (&outcome.video_path, outcome.success) {
        (Some(path), true) => {
            println!("{}", "✓ Render succeeded".green().bold());
            println!("  Video: {}", path.display().to_string().cyan());
        }
        _ => {
            let kind = outcome
                .failure
                .map(|kind| format!("{:?}", kind))
                .unwrap_or_else(|| "Unknown".to_string());
            println!("{} {}", "✗ Render failed:".red().bold(), kind.yellow());
            // Tracebacks end with the useful part
            let text = outcome.error_text();
            let lines: Vec<&str> = text.lines().collect();
            for line in &lines[lines.len().saturating_sub(ERROR_TAIL_LINES)..] {
                println!("  {}", line.dimmed());
            }
        }
    }
}
