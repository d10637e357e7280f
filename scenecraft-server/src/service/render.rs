//! Render Service
//!
//! Business logic for rendering submitted scripts.

use scenecraft_core::domain::{DEFAULT_SCENE, Resolution};
use scenecraft_core::dto::render::{RenderRequest, RenderResponse};
use scenecraft_python::extract_scene_name;
use scenecraft_runner::{ArtifactLocator, EngineCommand, EngineStatus, RunWorkspace, RunnerConfig};
use std::path::PathBuf;

/// Service error type
#[derive(Debug)]
pub enum RenderError {
    ValidationError(String),
    UnsafeCode(String),
    InternalError(String),
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(err: tokio::task::JoinError) -> Self {
        RenderError::InternalError(format!("Render task failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render a script and report what the engine produced
///
/// Engine failures and timeouts are part of the response, not errors.
pub async fn render(config: &RunnerConfig, req: RenderRequest) -> Result<RenderResponse> {
    validate_render_request(&req)?;

    let scene = resolve_scene(&req);
    let engine = EngineCommand::from_config(config)
        .with_quality(req.quality)
        .with_resolution(req.resolution.as_deref().and_then(Resolution::parse));

    let work_root = config.work_root.clone();
    let code = req.code;
    let workspace = tokio::task::spawn_blocking(move || RunWorkspace::create(&work_root, &code))
        .await?
        .map_err(|e| RenderError::InternalError(format!("{:#}", e)))?;

    tracing::info!("Rendering scene '{}' in run {}", scene, workspace.id());

    let run = engine
        .run(workspace.dir(), workspace.script_path(), &scene)
        .await
        .map_err(|e| RenderError::InternalError(format!("{:#}", e)))?;

    let response = match run.status {
        EngineStatus::TimedOut => RenderResponse {
            success: false,
            video_path: None,
            stdout: None,
            stderr: Some(run.stderr),
        },
        EngineStatus::Exited { success: false, .. } => RenderResponse {
            success: false,
            video_path: None,
            stdout: Some(run.stdout),
            stderr: Some(run.stderr),
        },
        EngineStatus::Exited { success: true, .. } => {
            let output = run.combined_output();
            let dir = workspace.dir().to_path_buf();
            let lookup_scene = scene.clone();
            let video = tokio::task::spawn_blocking(move || {
                ArtifactLocator::new().locate(&output, &lookup_scene, &dir)
            })
            .await?;

            match video {
                Some(path) => RenderResponse {
                    success: true,
                    video_path: Some(absolute(path).display().to_string()),
                    stdout: Some(run.stdout),
                    stderr: None,
                },
                None => RenderResponse {
                    success: false,
                    video_path: None,
                    stdout: Some(run.stdout),
                    stderr: Some(format!(
                        "Manim finished but no video file for scene '{}' was found",
                        scene
                    )),
                },
            }
        }
    };

    tracing::info!(
        "Render finished: success={}, video_path={:?}",
        response.success,
        response.video_path
    );

    Ok(response)
}

/// Validate a render request
fn validate_render_request(req: &RenderRequest) -> Result<()> {
    if req.code.trim().is_empty() {
        return Err(RenderError::ValidationError(
            "Script code cannot be empty".to_string(),
        ));
    }

    scenecraft_python::validate(&req.code).map_err(|e| RenderError::UnsafeCode(e.to_string()))
}

/// Scene to render: the requested one, else the first scene class, else the default
fn resolve_scene(req: &RenderRequest) -> String {
    req.scene_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| extract_scene_name(&req.code))
        .unwrap_or_else(|| DEFAULT_SCENE.to_string())
}

fn absolute(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecraft_core::domain::Quality;

    fn request(code: &str, scene_name: Option<&str>) -> RenderRequest {
        RenderRequest {
            code: code.to_string(),
            scene_name: scene_name.map(str::to_string),
            quality: Quality::Low,
            resolution: None,
        }
    }

    #[test]
    fn test_resolve_scene() {
        let code = "from manim import *\nclass Orbit(Scene):\n    pass\n";
        assert_eq!(resolve_scene(&request(code, Some("Other"))), "Other");
        assert_eq!(resolve_scene(&request(code, Some("  "))), "Orbit");
        assert_eq!(resolve_scene(&request(code, None)), "Orbit");
        assert_eq!(resolve_scene(&request("x = 1\n", None)), "Scene");
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            validate_render_request(&request("  ", None)),
            Err(RenderError::ValidationError(_))
        ));
        assert!(matches!(
            validate_render_request(&request("import subprocess\n", None)),
            Err(RenderError::UnsafeCode(_))
        ));
        assert!(validate_render_request(&request("from manim import *\n", None)).is_ok());
    }
}
