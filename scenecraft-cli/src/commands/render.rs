//! Render command handler

use anyhow::{Context, Result};
use colored::*;
use scenecraft_core::domain::CodeArtifact;
use scenecraft_runner::{ExecutionBackend, RenderBackend};

use super::{print_outcome, read_script};
use crate::config::Config;

/// Render a script file once through the execution backend
pub async fn render_file(config: Config, path: &str, scene: Option<String>) -> Result<()> {
    let code = read_script(path)?;
    let artifact = with_scene(scenecraft_python::artifact_from_source(code), scene);

    println!(
        "{} {}",
        "Rendering scene".bold(),
        artifact.scene_or_default().cyan()
    );

    let backend = RenderBackend::new(config.runner)?;
    let outcome = tokio::task::spawn_blocking(move || backend.execute(&artifact))
        .await
        .context("Render task panicked")?;

    print_outcome(&outcome);

    if !outcome.success {
        anyhow::bail!("render failed");
    }

    Ok(())
}

/// Overrides the extracted scene with an explicit one
fn with_scene(artifact: CodeArtifact, scene: Option<String>) -> CodeArtifact {
    match scene {
        Some(scene) => CodeArtifact::new(artifact.code, Some(scene)),
        None => artifact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_override() {
        let artifact =
            scenecraft_python::artifact_from_source("class Demo(Scene):\n    pass\n");
        assert_eq!(with_scene(artifact.clone(), None).scene_or_default(), "Demo");
        assert_eq!(
            with_scene(artifact, Some("Other".to_string())).scene_or_default(),
            "Other"
        );
    }
}
