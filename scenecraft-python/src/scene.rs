//! Scene identifier extraction

use scenecraft_core::domain::CodeArtifact;

/// Token a class declaration line must contain to count as a scene
const SCENE_MARKER: &str = "Scene";

/// Finds the name of the first scene class in a script
///
/// Looks for a `class` declaration line mentioning [`SCENE_MARKER`] (in its
/// name or its bases) and returns the class name without the base list.
///
/// # Example
/// ```
/// use scenecraft_python::extract_scene_name;
///
/// let code = "from manim import *\n\nclass Orbit(MovingCameraScene):\n    pass\n";
/// assert_eq!(extract_scene_name(code).as_deref(), Some("Orbit"));
/// ```
pub fn extract_scene_name(code: &str) -> Option<String> {
    code.lines()
        .map(str::trim_start)
        .filter(|line| line.contains(SCENE_MARKER))
        .filter_map(|line| line.strip_prefix("class"))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|rest| {
            rest.trim_start()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .find(|name| !name.is_empty())
}

/// Wraps source in a [`CodeArtifact`] with its extracted scene identifier
pub fn artifact_from_source(code: impl Into<String>) -> CodeArtifact {
    let code = code.into();
    let scene_id = extract_scene_name(&code);
    CodeArtifact::new(code, scene_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_scene() {
        let code = r#"
from manim import *

class Helper:
    pass

class FirstScene(Scene):
    def construct(self):
        pass

class SecondScene(Scene):
    pass
"#;
        assert_eq!(extract_scene_name(code).as_deref(), Some("FirstScene"));
    }

    #[test]
    fn test_marker_in_name_without_bases() {
        assert_eq!(
            extract_scene_name("class TitleScene:\n    pass\n").as_deref(),
            Some("TitleScene")
        );
    }

    #[test]
    fn test_no_scene_class() {
        assert_eq!(extract_scene_name("x = 1\nclass Helper:\n    pass\n"), None);
        assert_eq!(extract_scene_name("# classScene\n"), None);
        assert_eq!(extract_scene_name(""), None);
    }

    #[test]
    fn test_indented_declaration() {
        let code = "if True:\n    class Nested(Scene):\n        pass\n";
        assert_eq!(extract_scene_name(code).as_deref(), Some("Nested"));
    }

    #[test]
    fn test_artifact_from_source() {
        let artifact = artifact_from_source("class Demo(Scene):\n    pass\n");
        assert_eq!(artifact.scene_id.as_deref(), Some("Demo"));
        assert_eq!(artifact.scene_or_default(), "Demo");

        let anonymous = artifact_from_source("x = 1\n");
        assert_eq!(anonymous.scene_id, None);
        assert_eq!(anonymous.scene_or_default(), "Scene");
    }
}
