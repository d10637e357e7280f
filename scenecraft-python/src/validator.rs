//! Safety validator
//!
//! Parses a script, rejects it on syntax errors, then walks every node and
//! asks the configured [`SafetyPolicy`] about imports and calls.

use std::sync::Arc;
use tracing::debug;
use tree_sitter::Node;

use crate::error::UnsafeCodeError;
use crate::parser::{find_map, first_syntax_issue, node_text, parse};
use crate::policy::{DenylistPolicy, SafetyPolicy, SyntaxNode, Verdict};

/// Validates generated scripts against a safety policy
#[derive(Clone)]
pub struct Validator {
    policy: Arc<dyn SafetyPolicy>,
}

impl Validator {
    pub fn new(policy: impl SafetyPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Checks a script, returning the first rejection found
    pub fn validate(&self, code: &str) -> Result<(), UnsafeCodeError> {
        let tree = parse(code)?;

        if let Some(issue) = first_syntax_issue(&tree, code) {
            return Err(UnsafeCodeError::SyntaxInvalid(issue));
        }

        let source = code.as_bytes();
        let rejection = find_map(&tree, |node| {
            let construct = classify(node, source)?;
            match self.policy.check(&construct) {
                Verdict::Allow => None,
                Verdict::Deny(reason) => Some(UnsafeCodeError::Denied {
                    reason,
                    line: node.start_position().row + 1,
                }),
            }
        });

        match rejection {
            Some(err) => {
                debug!("Script rejected: {}", err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DenylistPolicy::default())
    }
}

/// Validates a script with the default denylist policy
///
/// # Example
/// ```
/// use scenecraft_python::validate;
///
/// assert!(validate("from manim import *\n").is_ok());
/// assert!(validate("import os\n").is_err());
/// ```
pub fn validate(code: &str) -> Result<(), UnsafeCodeError> {
    Validator::default().validate(code)
}

/// Maps a tree-sitter node onto the constructs policies care about
fn classify(node: Node<'_>, source: &[u8]) -> Option<SyntaxNode> {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            let modules = node
                .children_by_field_name("name", &mut cursor)
                .filter_map(|name| {
                    let dotted = if name.kind() == "aliased_import" {
                        name.child_by_field_name("name")?
                    } else {
                        name
                    };
                    root_segment(node_text(dotted, source))
                })
                .collect();
            Some(SyntaxNode::Import { modules })
        }
        "import_from_statement" => {
            let module = node.child_by_field_name("module_name")?;
            let dotted = if module.kind() == "relative_import" {
                let mut cursor = module.walk();
                let found = module
                    .named_children(&mut cursor)
                    .find(|child| child.kind() == "dotted_name");
                found?
            } else {
                module
            };
            let modules = root_segment(node_text(dotted, source))
                .into_iter()
                .collect();
            Some(SyntaxNode::Import { modules })
        }
        "call" => {
            let function = node.child_by_field_name("function")?;
            let callee = (function.kind() == "identifier")
                .then(|| node_text(function, source).to_string());

            let mut base = function;
            while base.kind() == "attribute" {
                match base.child_by_field_name("object") {
                    Some(object) => base = object,
                    None => break,
                }
            }
            let root = (base.kind() == "identifier").then(|| node_text(base, source).to_string());

            Some(SyntaxNode::Call { callee, root })
        }
        // Python 2 `exec "..."` statement
        "exec_statement" => Some(SyntaxNode::Call {
            callee: Some("exec".to_string()),
            root: Some("exec".to_string()),
        }),
        _ => None,
    }
}

/// First segment of a dotted module path (`os` for `os.path`)
fn root_segment(dotted: &str) -> Option<String> {
    let root = dotted.split('.').next()?.trim();
    (!root.is_empty()).then(|| root.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE_SCENE: &str = r#"
from manim import *
import numpy as np

class Orbit(Scene):
    def construct(self):
        circle = Circle(radius=2, color=BLUE)
        dot = Dot().move_to(circle.point_from_proportion(0))
        self.play(Create(circle), FadeIn(dot))
        self.play(MoveAlongPath(dot, circle), run_time=2)
        self.wait()
"#;

    fn reason(code: &str) -> String {
        validate(code).unwrap_err().to_string()
    }

    #[test]
    fn test_safe_scene_passes() {
        assert!(validate(SAFE_SCENE).is_ok());
    }

    #[test]
    fn test_import_os_rejected() {
        assert_eq!(reason("import os\n"), "Blocked import detected: 'os'.");
    }

    #[test]
    fn test_dotted_and_aliased_imports_rejected() {
        assert_eq!(reason("import os.path\n"), "Blocked import detected: 'os'.");
        assert_eq!(
            reason("import numpy as np, subprocess as sp\n"),
            "Blocked import detected: 'subprocess'."
        );
    }

    #[test]
    fn test_from_imports_rejected() {
        assert_eq!(
            reason("from urllib.request import urlopen\n"),
            "Blocked import detected: 'urllib'."
        );
        assert_eq!(
            reason("from .shutil import rmtree\n"),
            "Blocked import detected: 'shutil'."
        );
        assert!(validate("from . import helpers\n").is_ok());
    }

    #[test]
    fn test_every_denied_module_is_rejected() {
        for module in ["sys", "socket", "ctypes", "threading", "importlib", "builtins"] {
            let code = format!("import {module}\n");
            assert!(validate(&code).is_err(), "{module} should be rejected");
        }
    }

    #[test]
    fn test_eval_and_exec_rejected_with_name() {
        assert!(reason("x = eval('1 + 1')\n").contains("eval"));
        assert!(reason("exec('print(1)')\n").contains("exec"));
        assert!(reason("f = open('/etc/passwd')\n").contains("open"));
        assert!(reason("m = __import__('os')\n").contains("__import__"));
    }

    #[test]
    fn test_nested_call_rejected() {
        let code = r#"
from manim import *

class Sneaky(Scene):
    def construct(self):
        label = Text(str(eval("2 + 2")))
        self.add(label)
"#;
        let err = validate(code).unwrap_err();
        assert!(err.to_string().contains("eval"));
        match err {
            UnsafeCodeError::Denied { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_call_root_rejected() {
        assert_eq!(
            reason("__builtins__.print('hi')\n"),
            "Blocked call root detected: '__builtins__'."
        );
        assert_eq!(
            reason("os.path.join('a', 'b')\n"),
            "Blocked call root detected: 'os'."
        );
    }

    #[test]
    fn test_method_calls_on_scene_objects_pass() {
        assert!(validate("self.play(Write(title))\ncircle.animate.shift(UP)\n").is_ok());
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = validate("from manim import *\nx = (1,\n").unwrap_err();
        assert!(err.is_syntax_error());
        assert!(err.to_string().starts_with("Generated code is not valid Python ("));
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn test_bad_indentation_rejected_as_syntax_error() {
        let err = validate("from manim import *\nx = 1\n    y = 2\n").unwrap_err();
        assert!(err.is_syntax_error());
        assert!(err.to_string().contains("unexpected indent line 3"));

        assert!(validate("print \"hi\"\n").unwrap_err().is_syntax_error());
    }

    #[test]
    fn test_obfuscated_access_is_not_detected() {
        // Runtime-assembled access paths are outside what a static filter sees.
        let code = "g = globals()\nf = getattr(g['__builtins__'], 'ev' + 'al')\n";
        assert!(validate(code).is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let validator = Validator::new(DenylistPolicy::empty().with_call("getattr"));
        assert!(validator.validate("import os\n").is_ok());
        assert!(validator.validate("getattr(x, 'y')\n").is_err());
    }
}
