//! Pipeline orchestrator
//!
//! Drives one request through refine, generate and execute, then alternates
//! between fixing and executing until a render succeeds or the retry ceiling
//! is reached.
//!
//! ```text
//! Refining -> Generating -> Executing -+-> Succeeded
//!                              ^       |
//!                              |       +-> Fixing (retries < ceiling)
//!                              +-------+
//!                                      +-> Failed  (retries == ceiling)
//! ```

use scenecraft_core::domain::{CodeArtifact, ExecutionOutcome, RefinedSpec, Request};
use scenecraft_runner::ExecutionBackend;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::{GenerationError, SceneGenerator};

/// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Refining,
    Generating,
    Executing,
    Fixing,
    Succeeded,
    Failed,
}

impl Stage {
    /// Whether the pipeline stops in this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }
}

/// What happens after an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Succeed,
    Fix,
    Fail,
}

/// Routes an execution outcome
///
/// # Arguments
/// * `outcome` - Outcome of the latest execution
/// * `retries` - Fix attempts made so far
/// * `ceiling` - Maximum number of fix attempts
pub fn decide(outcome: &ExecutionOutcome, retries: u32, ceiling: u32) -> Decision {
    if outcome.success {
        Decision::Succeed
    } else if retries < ceiling {
        Decision::Fix
    } else {
        Decision::Fail
    }
}

/// Everything known about one pipeline run so far
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub request: Request,
    pub refined: Option<RefinedSpec>,
    pub artifact: Option<CodeArtifact>,
    pub outcome: Option<ExecutionOutcome>,
    /// Error text of the failed execution awaiting a fix
    pub error_text: Option<String>,
    pub retries: u32,
    pub stage: Stage,
}

impl PipelineState {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            refined: None,
            artifact: None,
            outcome: None,
            error_text: None,
            retries: 0,
            stage: Stage::Refining,
        }
    }
}

/// Receives every stage transition
pub trait PipelineObserver: Send + Sync {
    fn on_stage(&self, state: &PipelineState);
}

/// Observer that only logs
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, state: &PipelineState) {
        match state.stage {
            Stage::Fixing => warn!(
                "Render failed, fixing (attempt {}): {}",
                state.retries + 1,
                state.error_text.as_deref().unwrap_or_default()
            ),
            stage => info!("Stage {:?} (retries={})", stage, state.retries),
        }
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Succeeded,
    RetryCeilingReached,
}

/// Final result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub request: Request,
    pub refined: RefinedSpec,
    /// Last artifact executed
    pub artifact: CodeArtifact,
    /// Outcome of the last execution
    pub outcome: ExecutionOutcome,
    pub retries: u32,
    pub status: PipelineStatus,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.status == PipelineStatus::Succeeded
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Code generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Generate-execute-repair loop
pub struct Pipeline {
    generator: Arc<dyn SceneGenerator>,
    backend: Arc<dyn ExecutionBackend>,
    max_retries: u32,
    observer: Arc<dyn PipelineObserver>,
}

impl Pipeline {
    /// Creates a pipeline
    ///
    /// # Arguments
    /// * `generator` - Produces and repairs artifacts
    /// * `backend` - Executes artifacts
    /// * `max_retries` - Maximum number of fix attempts
    pub fn new(
        generator: Arc<dyn SceneGenerator>,
        backend: Arc<dyn ExecutionBackend>,
        max_retries: u32,
    ) -> Self {
        Self {
            generator,
            backend,
            max_retries,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the stage observer
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs the pipeline for one request
    ///
    /// Execution failures never produce an error: they end in a report with
    /// [`PipelineStatus::RetryCeilingReached`]. Errors come only from the
    /// generator.
    pub fn run(&self, request: Request) -> Result<PipelineReport, PipelineError> {
        let mut state = PipelineState::new(request);
        self.enter(&mut state, Stage::Refining);

        let refined = self.generator.refine(&state.request)?;
        state.refined = Some(refined.clone());

        self.enter(&mut state, Stage::Generating);
        let mut artifact = self.generator.generate(&refined)?;
        state.artifact = Some(artifact.clone());

        loop {
            self.enter(&mut state, Stage::Executing);
            let outcome = self.backend.execute(&artifact);
            state.error_text = (!outcome.success).then(|| outcome.error_text());
            state.outcome = Some(outcome.clone());

            let status = match decide(&outcome, state.retries, self.max_retries) {
                Decision::Succeed => {
                    self.enter(&mut state, Stage::Succeeded);
                    PipelineStatus::Succeeded
                }
                Decision::Fail => {
                    self.enter(&mut state, Stage::Failed);
                    PipelineStatus::RetryCeilingReached
                }
                Decision::Fix => {
                    self.enter(&mut state, Stage::Fixing);
                    let error_text = state
                        .error_text
                        .take()
                        .unwrap_or_else(|| outcome.error_text());
                    artifact = self.generator.repair(&refined, &artifact, &error_text)?;
                    state.artifact = Some(artifact.clone());
                    state.retries += 1;
                    continue;
                }
            };

            return Ok(PipelineReport {
                request: state.request,
                refined,
                artifact,
                outcome,
                retries: state.retries,
                status,
            });
        }
    }

    fn enter(&self, state: &mut PipelineState, stage: Stage) {
        state.stage = stage;
        self.observer.on_stage(state);
    }
}
