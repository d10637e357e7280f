//! Runner configuration
//!
//! Defines all configurable parameters of the execution backend: where run
//! directories and finished videos live, how the engine is invoked, and how
//! the optional render server is reached.

use scenecraft_core::domain::{Quality, Resolution};
use std::path::PathBuf;
use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Parent directory of the per-run working directories
    pub work_root: PathBuf,

    /// Directory successful videos are copied into
    pub output_dir: PathBuf,

    /// Render quality passed to the engine
    pub quality: Quality,

    /// Optional output resolution override
    pub resolution: Option<Resolution>,

    /// Wall-clock limit for one engine process
    pub render_timeout: Duration,

    /// Render server base URL (e.g., "http://localhost:8090")
    pub render_server_url: Option<String>,

    /// Upper bound for one request to the render server
    pub transport_timeout: Duration,

    /// Program that starts the engine
    pub program: String,

    /// Arguments placed before the render options
    pub program_args: Vec<String>,
}

impl RunnerConfig {
    /// Creates a new configuration with defaults
    pub fn new(work_root: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            work_root,
            output_dir,
            quality: Quality::Medium,
            resolution: Some(Resolution {
                width: 1920,
                height: 1080,
            }),
            render_timeout: Duration::from_secs(300),
            render_server_url: None,
            transport_timeout: Duration::from_secs(320),
            program: "python3".to_string(),
            program_args: vec!["-m".to_string(), "manim".to_string()],
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SCENECRAFT_WORK_ROOT (optional, default: <tmp>/manim_executor)
    /// - SCENECRAFT_OUTPUT_DIR (optional, default: videos)
    /// - MANIM_QUALITY (optional, low|medium|high, default: medium)
    /// - MANIM_RESOLUTION (optional, WxH, default: 1920x1080)
    /// - RENDER_TIMEOUT (optional, seconds, default: 300)
    /// - RENDER_SERVER_URL (optional, no default)
    /// - TRANSPORT_TIMEOUT (optional, seconds, default: 320)
    /// - MANIM_PROGRAM (optional, default: python3)
    /// - MANIM_PROGRAM_ARGS (optional, whitespace separated, default: "-m manim")
    pub fn from_env() -> anyhow::Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(root) = var("SCENECRAFT_WORK_ROOT") {
            config.work_root = PathBuf::from(root);
        }

        if let Some(dir) = var("SCENECRAFT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        if let Some(quality) = var("MANIM_QUALITY") {
            config.quality = Quality::parse_or_default(&quality);
        }

        if let Some(resolution) = var("MANIM_RESOLUTION") {
            // Unparseable values fall back to the engine's own default
            config.resolution = Resolution::parse(&resolution);
        }

        if let Some(secs) = var("RENDER_TIMEOUT") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("RENDER_TIMEOUT must be a number of seconds"))?;
            config.render_timeout = Duration::from_secs(secs);
        }

        config.render_server_url = var("RENDER_SERVER_URL");

        config.transport_timeout = var("TRANSPORT_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.transport_timeout);

        if let Some(program) = var("MANIM_PROGRAM") {
            config.program = program;
        }

        if let Ok(args) = std::env::var("MANIM_PROGRAM_ARGS") {
            config.program_args = args.split_whitespace().map(str::to_string).collect();
        }

        Ok(config)
    }

    /// Sets the render server URL
    pub fn with_render_server(mut self, url: impl Into<String>) -> Self {
        self.render_server_url = Some(url.into());
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program.trim().is_empty() {
            anyhow::bail!("program cannot be empty");
        }

        if self.render_timeout.is_zero() {
            anyhow::bail!("render_timeout must be greater than 0");
        }

        if let Some(url) = &self.render_server_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("render_server_url must start with http:// or https://");
            }

            if self.transport_timeout.is_zero() {
                anyhow::bail!("transport_timeout must be greater than 0");
            }
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(
            std::env::temp_dir().join("manim_executor"),
            PathBuf::from("videos"),
        )
    }
}
