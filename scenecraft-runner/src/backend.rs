//! Execution backend
//!
//! Turns a code artifact into an execution outcome:
//! - Validates the code before any process is started or lock is taken
//! - Refuses concurrent renders on the same backend instance
//! - Writes the script into a fresh run directory
//! - Renders through the render server when one is configured
//! - Falls back to running the engine locally when the server is unavailable
//! - Locates the produced video and copies it into the output directory
//!
//! Every failure is reported as a value inside [`ExecutionOutcome`].

use scenecraft_client::RenderClient;
use scenecraft_core::domain::{CodeArtifact, ExecutionOutcome, FailureKind};
use scenecraft_core::dto::render::RenderRequest;
use scenecraft_python::Validator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::bridge::run_blocking;
use crate::config::RunnerConfig;
use crate::engine::{EngineCommand, EngineStatus};
use crate::locator::ArtifactLocator;
use crate::lock::RenderLock;
use crate::transport::{RenderTransport, TransportError};
use crate::workspace::RunWorkspace;

/// Message reported when a render is refused because another one is running
pub const LOCK_CONTENTION_MESSAGE: &str = "Another render is already in progress";

/// Executes code artifacts
pub trait ExecutionBackend: Send + Sync {
    /// Executes one artifact and reports what happened
    ///
    /// Blocks until the render finishes, fails, times out or is refused.
    fn execute(&self, artifact: &CodeArtifact) -> ExecutionOutcome;
}

/// Standard implementation of ExecutionBackend
pub struct RenderBackend {
    config: RunnerConfig,
    engine: EngineCommand,
    validator: Validator,
    transport: Option<Arc<dyn RenderTransport>>,
    locator: ArtifactLocator,
    lock: RenderLock,
}

impl RenderBackend {
    /// Creates a backend from configuration
    ///
    /// A render server client is created when `render_server_url` is set.
    pub fn new(config: RunnerConfig) -> anyhow::Result<Self> {
        let transport: Option<Arc<dyn RenderTransport>> = match &config.render_server_url {
            Some(url) => {
                info!("Render server configured at {}", url);
                Some(Arc::new(RenderClient::new(url.clone(), config.transport_timeout)?))
            }
            None => None,
        };

        Ok(Self {
            engine: EngineCommand::from_config(&config),
            config,
            validator: Validator::default(),
            transport,
            locator: ArtifactLocator::new(),
            lock: RenderLock::new(),
        })
    }

    /// Replaces the primary transport
    pub fn with_transport(mut self, transport: Arc<dyn RenderTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the engine command used by the local fallback
    pub fn with_engine(mut self, engine: EngineCommand) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the safety validator
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    async fn render(&self, workspace: &RunWorkspace, code: &str, scene: &str) -> ExecutionOutcome {
        if let Some(transport) = &self.transport {
            match self.render_remote(transport.as_ref(), code, scene).await {
                Ok(outcome) => return outcome,
                Err(e) => warn!("Render server failed, rendering locally: {}", e),
            }
        }

        self.render_local(workspace, scene).await
    }

    /// Renders through the server
    ///
    /// Returns `Err` only when the local fallback should run.
    async fn render_remote(
        &self,
        transport: &dyn RenderTransport,
        code: &str,
        scene: &str,
    ) -> Result<ExecutionOutcome, TransportError> {
        let request = RenderRequest {
            code: code.to_string(),
            scene_name: Some(scene.to_string()),
            quality: self.config.quality,
            resolution: self.config.resolution.map(|r| r.to_string()),
        };

        let response = match transport.render(&request).await {
            Ok(response) => response,
            Err(e) if e.allows_fallback() => return Err(e),
            Err(e) => {
                info!("Render server reported failure");
                return Ok(ExecutionOutcome::failed(
                    FailureKind::ApplicationError,
                    e.to_string(),
                    None,
                ));
            }
        };

        if !response.success {
            let stderr = response
                .stderr
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Render server reported an unsuccessful render".to_string());
            return Ok(ExecutionOutcome::failed(
                FailureKind::RenderFailed,
                stderr,
                response.stdout,
            ));
        }

        match response.video_path.map(PathBuf::from) {
            Some(path) if path.is_file() => Ok(ExecutionOutcome::rendered(path, response.stdout)),
            Some(path) => Err(TransportError::Protocol(format!(
                "reported video {} is not readable locally",
                path.display()
            ))),
            None => Err(TransportError::Protocol(
                "render succeeded without a video path".to_string(),
            )),
        }
    }

    async fn render_local(&self, workspace: &RunWorkspace, scene: &str) -> ExecutionOutcome {
        let run = match self
            .engine
            .run(workspace.dir(), workspace.script_path(), scene)
            .await
        {
            Ok(run) => run,
            Err(e) => {
                error!("Failed to run render engine: {:#}", e);
                return ExecutionOutcome::failed(FailureKind::Internal, format!("{:#}", e), None);
            }
        };

        match run.status {
            EngineStatus::TimedOut => {
                ExecutionOutcome::failed(FailureKind::TimedOut, run.stderr, None)
            }
            EngineStatus::Exited { success: false, code } => {
                let stderr = if run.stderr.trim().is_empty() {
                    match code {
                        Some(code) => format!("Manim exited with status {}", code),
                        None => "Manim was terminated by a signal".to_string(),
                    }
                } else {
                    run.stderr
                };
                ExecutionOutcome::failed(FailureKind::RenderFailed, stderr, Some(run.stdout))
            }
            EngineStatus::Exited { success: true, .. } => {
                match self
                    .locator
                    .locate(&run.combined_output(), scene, workspace.dir())
                {
                    Some(path) => ExecutionOutcome::rendered(path, Some(run.stdout)),
                    None => ExecutionOutcome::failed(
                        FailureKind::RenderFailed,
                        format!(
                            "Manim finished but no video file for scene '{}' was found",
                            scene
                        ),
                        Some(run.stdout),
                    ),
                }
            }
        }
    }

    /// Copies a rendered video into the output directory
    ///
    /// Returns the copy, or the original path if copying failed.
    fn publish(&self, video: PathBuf, run_id: &str, scene: &str) -> PathBuf {
        let target = self
            .config
            .output_dir
            .join(format!("{}_{}.mp4", run_id, scene));

        match copy_video(&video, &target) {
            Ok(()) => {
                info!("Video saved to {}", target.display());
                target
            }
            Err(e) => {
                warn!(
                    "Failed to copy video to {}: {}, keeping {}",
                    target.display(),
                    e,
                    video.display()
                );
                video
            }
        }
    }
}

fn copy_video(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to).map(|_| ())
}

impl ExecutionBackend for RenderBackend {
    fn execute(&self, artifact: &CodeArtifact) -> ExecutionOutcome {
        if let Err(e) = self.validator.validate(&artifact.code) {
            warn!("Rejected unsafe code: {}", e);
            return ExecutionOutcome::failed(FailureKind::UnsafeCode, e.to_string(), None);
        }

        let Some(_guard) = self.lock.try_acquire() else {
            warn!("Render refused: {}", LOCK_CONTENTION_MESSAGE);
            return ExecutionOutcome::failed(
                FailureKind::LockContention,
                LOCK_CONTENTION_MESSAGE,
                None,
            );
        };

        let workspace = match RunWorkspace::create(&self.config.work_root, &artifact.code) {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("Failed to prepare run directory: {:#}", e);
                return ExecutionOutcome::failed(FailureKind::Internal, format!("{:#}", e), None);
            }
        };

        let scene = artifact.scene_or_default();
        info!("Rendering scene '{}' in run {}", scene, workspace.id());

        let mut outcome = match run_blocking(self.render(&workspace, &artifact.code, scene)) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Render task failed: {:#}", e);
                return ExecutionOutcome::failed(FailureKind::Internal, format!("{:#}", e), None);
            }
        };

        if let Some(video) = outcome.video_path.take() {
            outcome.video_path = Some(self.publish(video, workspace.id(), scene));
        }

        debug!(
            "Run {} finished: success={}, failure={:?}",
            workspace.id(),
            outcome.success,
            outcome.failure
        );

        outcome
    }
}
