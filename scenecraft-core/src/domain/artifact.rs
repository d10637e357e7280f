//! Code artifact domain type

use serde::{Deserialize, Serialize};

/// Scene identifier used when none could be extracted from the code
pub const DEFAULT_SCENE: &str = "Scene";

/// A candidate script produced by the generation service
///
/// Artifacts are values: a repair attempt produces a new artifact instead of
/// editing the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    /// Full Python source
    pub code: String,
    /// Name of the scene class to render, if one was found
    pub scene_id: Option<String>,
}

impl CodeArtifact {
    pub fn new(code: impl Into<String>, scene_id: Option<String>) -> Self {
        Self {
            code: code.into(),
            scene_id,
        }
    }

    /// Returns the scene to render, falling back to [`DEFAULT_SCENE`]
    pub fn scene_or_default(&self) -> &str {
        match self.scene_id.as_deref() {
            Some(scene) if !scene.trim().is_empty() => scene,
            _ => DEFAULT_SCENE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_or_default_uses_extracted_name() {
        let artifact = CodeArtifact::new("class Intro(Scene): pass", Some("Intro".to_string()));
        assert_eq!(artifact.scene_or_default(), "Intro");
    }

    #[test]
    fn test_scene_or_default_falls_back() {
        let artifact = CodeArtifact::new("x = 1", None);
        assert_eq!(artifact.scene_or_default(), DEFAULT_SCENE);

        let blank = CodeArtifact::new("x = 1", Some("  ".to_string()));
        assert_eq!(blank.scene_or_default(), DEFAULT_SCENE);
    }
}
