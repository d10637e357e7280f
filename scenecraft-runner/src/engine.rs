//! Render engine invocation
//!
//! Builds the engine command line and runs it as a child process with a hard
//! wall-clock limit. Used by the local fallback path of the backend and by the
//! render server, so both run the identical command.

use anyhow::{Context, Result};
use scenecraft_core::domain::{Quality, Resolution};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::RunnerConfig;

const ENGINE_ENV: [(&str, &str); 4] = [
    ("PYTHONUNBUFFERED", "1"),
    ("PYTHONIOENCODING", "utf-8"),
    ("TERM", "dumb"),
    ("NO_COLOR", "1"),
];

/// How the engine is started
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub program: String,
    pub program_args: Vec<String>,
    pub quality: Quality,
    pub resolution: Option<Resolution>,
    pub timeout: Duration,
}

/// How an engine run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// The process exited on its own
    Exited { success: bool, code: Option<i32> },
    /// The process was killed at the time limit
    TimedOut,
}

/// Captured result of one engine run
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub status: EngineStatus,
    pub stdout: String,
    pub stderr: String,
}

impl EngineRun {
    /// Exited with a success status
    pub fn succeeded(&self) -> bool {
        matches!(self.status, EngineStatus::Exited { success: true, .. })
    }

    /// stdout and stderr joined, for artifact path scanning
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

impl EngineCommand {
    /// Creates an engine command from runner configuration
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            program: config.program.clone(),
            program_args: config.program_args.clone(),
            quality: config.quality,
            resolution: config.resolution,
            timeout: config.render_timeout,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        self.resolution = resolution;
        self
    }

    /// Arguments after the program name
    ///
    /// # Arguments
    /// * `script` - Path of the script file
    /// * `scene` - Scene class to render
    pub fn arguments(&self, script: &Path, scene: &str) -> Vec<String> {
        let mut args = self.program_args.clone();
        args.push(self.quality.flag().to_string());

        if let Some(resolution) = self.resolution {
            args.push("-r".to_string());
            args.push(resolution.as_engine_arg());
        }

        args.extend(
            [
                "--renderer",
                "cairo",
                "--disable_caching",
                "--progress_bar",
                "none",
            ]
            .map(str::to_string),
        );
        args.push(script.display().to_string());
        args.push(scene.to_string());
        args
    }

    /// Runs the engine in `run_dir` and waits for it, up to the timeout
    ///
    /// Returns an error only if the process could not be started or awaited.
    /// On timeout the child is killed and its output discarded.
    pub async fn run(&self, run_dir: &Path, script: &Path, scene: &str) -> Result<EngineRun> {
        let args = self.arguments(script, scene);
        debug!("Running engine: {} {}", self.program, args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .envs(ENGINE_ENV)
            .current_dir(run_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start render engine '{}'", self.program))?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.context("Failed to wait for render engine")?,
            Err(_) => {
                warn!(
                    "Render engine exceeded {}s limit, killed",
                    self.timeout.as_secs()
                );
                return Ok(EngineRun {
                    status: EngineStatus::TimedOut,
                    stdout: String::new(),
                    stderr: self.timeout_message(),
                });
            }
        };

        let run = EngineRun {
            status: EngineStatus::Exited {
                success: output.status.success(),
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "Engine exited: status={:?}, stdout_len={}, stderr_len={}",
            run.status,
            run.stdout.len(),
            run.stderr.len()
        );

        Ok(run)
    }

    /// Message reported when a run hits the time limit
    pub fn timeout_message(&self) -> String {
        format!(
            "Manim execution timed out after {} seconds",
            self.timeout.as_secs()
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Shell script standing in for the engine
    ///
    /// Invoked as `sh <script> <render args…> <scene script> <scene>`. It
    /// writes an empty video where the real engine would and prints its path.
    pub(crate) const FAKE_ENGINE: &str = r#"
for last; do :; done
scene="$last"
out="media/videos/scene_script/720p30"
mkdir -p "$out"
: > "$out/$scene.mp4"
echo "File ready at $(pwd)/$out/$scene.mp4"
"#;

    /// Writes a fake engine script and returns an engine command running it
    pub(crate) fn fake_engine(dir: &Path, body: &str, timeout: Duration) -> EngineCommand {
        let script = dir.join("fake_engine.sh");
        std::fs::write(&script, body).unwrap();
        EngineCommand {
            program: "sh".to_string(),
            program_args: vec![script.display().to_string()],
            quality: Quality::Low,
            resolution: None,
            timeout,
        }
    }

    #[test]
    fn test_arguments_layout() {
        let command = EngineCommand {
            program: "python3".to_string(),
            program_args: vec!["-m".to_string(), "manim".to_string()],
            quality: Quality::High,
            resolution: Resolution::parse("1280x720"),
            timeout: Duration::from_secs(10),
        };

        let args = command.arguments(&PathBuf::from("/w/scene_script.py"), "Demo");
        assert_eq!(
            args,
            vec![
                "-m",
                "manim",
                "-qh",
                "-r",
                "1280,720",
                "--renderer",
                "cairo",
                "--disable_caching",
                "--progress_bar",
                "none",
                "/w/scene_script.py",
                "Demo",
            ]
        );
    }

    #[test]
    fn test_arguments_without_resolution() {
        let mut command = EngineCommand::from_config(&RunnerConfig::default());
        command.resolution = None;
        let args = command.arguments(&PathBuf::from("s.py"), "Scene");
        assert!(!args.contains(&"-r".to_string()));
        assert_eq!(args[2], "-qm");
    }

    #[test]
    fn test_timeout_message() {
        let command = EngineCommand::from_config(&RunnerConfig::default());
        assert_eq!(
            command.timeout_message(),
            "Manim execution timed out after 300 seconds"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_engine(dir.path(), FAKE_ENGINE, Duration::from_secs(10));
        let script = dir.path().join("scene_script.py");

        let run = command.run(dir.path(), &script, "Demo").await.unwrap();
        assert!(run.succeeded());
        assert!(run.stdout.contains("Demo.mp4"));
        assert!(
            dir.path()
                .join("media/videos/scene_script/720p30/Demo.mp4")
                .exists()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_engine(
            dir.path(),
            "echo 'NameError: name Foo is not defined' >&2\nexit 1\n",
            Duration::from_secs(10),
        );

        let run = command
            .run(dir.path(), &dir.path().join("s.py"), "Demo")
            .await
            .unwrap();
        assert!(!run.succeeded());
        assert_eq!(
            run.status,
            EngineStatus::Exited {
                success: false,
                code: Some(1)
            }
        );
        assert!(run.stderr.contains("NameError"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_engine(dir.path(), "sleep 5\n", Duration::from_millis(200));

        let started = std::time::Instant::now();
        let run = command
            .run(dir.path(), &dir.path().join("s.py"), "Demo")
            .await
            .unwrap();

        assert_eq!(run.status, EngineStatus::TimedOut);
        assert!(run.stderr.starts_with("Manim execution timed out after"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut command = EngineCommand::from_config(&RunnerConfig::default());
        command.program = "scenecraft-no-such-engine".to_string();

        let result = command.run(dir.path(), &dir.path().join("s.py"), "Demo").await;
        assert!(result.is_err());
    }
}
