//! Scenecraft CLI
//!
//! Command-line interface for turning animation prompts into Manim videos.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, Overrides};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "scenecraft")]
#[command(about = "Prompt-to-animation generator for Manim", long_about = None)]
struct Cli {
    /// Render server URL (renders locally when unset or unreachable)
    #[arg(long, global = true, env = "RENDER_SERVER_URL")]
    render_server_url: Option<String>,

    /// Render quality: low, medium or high
    #[arg(long, global = true, env = "MANIM_QUALITY")]
    quality: Option<String>,

    /// Output resolution, e.g. 1920x1080
    #[arg(long, global = true, env = "MANIM_RESOLUTION")]
    resolution: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they don't mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scenecraft_cli=warn,scenecraft_pipeline=info,scenecraft_runner=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(Overrides {
        render_server_url: cli.render_server_url,
        quality: cli.quality,
        resolution: cli.resolution,
    })?;

    handle_command(cli.command, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "scenecraft",
            "run",
            "a circle turns into a square",
            "--max-retries",
            "5",
            "--show-code",
            "--quality",
            "low",
        ])
        .unwrap();

        assert_eq!(cli.quality.as_deref(), Some("low"));
        match cli.command {
            Commands::Run {
                prompt,
                max_retries,
                show_code,
            } => {
                assert_eq!(prompt, "a circle turns into a square");
                assert_eq!(max_retries, 5);
                assert!(show_code);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_render_with_scene() {
        let cli =
            Cli::try_parse_from(["scenecraft", "render", "demo.py", "--scene", "Demo"]).unwrap();

        match cli.command {
            Commands::Render { file, scene } => {
                assert_eq!(file, "demo.py");
                assert_eq!(scene.as_deref(), Some("Demo"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_prompt() {
        assert!(Cli::try_parse_from(["scenecraft", "run"]).is_err());
    }
}
