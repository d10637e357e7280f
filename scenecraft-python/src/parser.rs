//! Python source parser
//!
//! Thin wrapper around the tree-sitter Python grammar. tree-sitter recovers
//! from errors instead of failing, so a parse "succeeds" for any input and
//! syntax problems show up as ERROR or MISSING nodes in the tree.

use std::fmt;
use tree_sitter::{Node, Parser, Tree};

use crate::error::UnsafeCodeError;
use crate::indent::indentation_issue;

/// First syntax problem found in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}", self.message, self.line)
    }
}

/// Parses Python source into a syntax tree
pub(crate) fn parse(source: &str) -> Result<Tree, UnsafeCodeError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| UnsafeCodeError::ParserUnavailable(e.to_string()))?;

    parser
        .parse(source, None)
        .ok_or_else(|| UnsafeCodeError::ParserUnavailable("parsing was cancelled".to_string()))
}

/// Visits every node in pre-order until `visit` returns a value
pub(crate) fn find_map<'tree, T>(
    tree: &'tree Tree,
    mut visit: impl FnMut(Node<'tree>) -> Option<T>,
) -> Option<T> {
    let mut cursor = tree.walk();

    loop {
        if let Some(found) = visit(cursor.node()) {
            return Some(found);
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Returns the first syntax problem in a parsed tree
///
/// Combines tree errors with the checks tree-sitter does not make: block
/// indentation, Python 2 statements and bare assignment expressions.
pub(crate) fn first_syntax_issue(tree: &Tree, source: &str) -> Option<SyntaxIssue> {
    [
        tree_error(tree),
        rejected_construct(tree),
        indentation_issue(source),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|issue| issue.line)
}

fn tree_error(tree: &Tree) -> Option<SyntaxIssue> {
    if !tree.root_node().has_error() {
        return None;
    }

    find_map(tree, |node| {
        if node.is_missing() {
            Some(SyntaxIssue {
                line: node.start_position().row + 1,
                message: format!("missing '{}'", node.kind()),
            })
        } else if node.is_error() {
            Some(SyntaxIssue {
                line: node.start_position().row + 1,
                message: "invalid syntax".to_string(),
            })
        } else {
            None
        }
    })
}

/// Constructs the grammar accepts but Python 3 does not
fn rejected_construct(tree: &Tree) -> Option<SyntaxIssue> {
    find_map(tree, |node| {
        let message = match node.kind() {
            "print_statement" => "Python 2 print statement",
            "exec_statement" => "Python 2 exec statement",
            "named_expression"
                if node
                    .parent()
                    .is_some_and(|parent| parent.kind() == "expression_statement") =>
            {
                "unparenthesized assignment expression"
            }
            _ => return None,
        };
        Some(SyntaxIssue {
            line: node.start_position().row + 1,
            message: message.to_string(),
        })
    })
}

/// Checks whether `source` is syntactically valid Python
///
/// Returns `None` for valid code, otherwise the first problem found.
///
/// # Example
/// ```
/// use scenecraft_python::syntax_error;
///
/// assert!(syntax_error("x = 1\n").is_none());
///
/// let issue = syntax_error("x = 1\ndef broken(:\n    pass\n");
/// assert!(issue.is_some());
/// ```
pub fn syntax_error(source: &str) -> Option<SyntaxIssue> {
    match parse(source) {
        Ok(tree) => first_syntax_issue(&tree, source),
        Err(e) => Some(SyntaxIssue {
            line: 1,
            message: e.to_string(),
        }),
    }
}

/// Text of a node, or an empty string if it is not valid UTF-8
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_scene_has_no_issue() {
        let source = r#"
from manim import *

class Intro(Scene):
    def construct(self):
        title = Text("Hello")
        self.play(Write(title))
        self.wait(1)
"#;
        assert_eq!(syntax_error(source), None);
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let source = "from manim import *\n\nx = foo(1, 2\ny = 3\n";
        let issue = syntax_error(source).expect("should report a syntax issue");
        assert!(issue.line >= 3);
    }

    #[test]
    fn test_indentation_errors_are_reported() {
        let nested = "class Demo(Scene):\n    def construct(self):\n        a = 1\n          b = 2\n";
        let issue = syntax_error(nested).expect("unexpected indent");
        assert_eq!(issue.line, 4);

        let dedent = syntax_error("if x:\n    a = 1\n  b = 2\n").expect("bad dedent");
        assert_eq!(dedent.line, 3);

        assert!(syntax_error("a = 1\n  b = 2\n").is_some());
    }

    #[test]
    fn test_python2_statements_are_reported() {
        let issue = syntax_error("print \"hello\"\n").expect("print statement");
        assert_eq!(issue.message, "Python 2 print statement");

        assert!(syntax_error("exec \"x = 1\"\n").is_some());
        assert_eq!(syntax_error("print(\"hello\")\n"), None);
        assert_eq!(syntax_error("exec_code = 1\nprint(exec_code)\n"), None);
    }

    #[test]
    fn test_bare_assignment_expression() {
        assert!(syntax_error("x := 5\n").is_some());
        assert_eq!(syntax_error("(x := 5)\n"), None);
        assert_eq!(syntax_error("if (n := 3) > 2:\n    pass\n"), None);
    }

    #[test]
    fn test_issue_display_includes_line() {
        let issue = SyntaxIssue {
            line: 7,
            message: "invalid syntax".to_string(),
        };
        assert_eq!(issue.to_string(), "invalid syntax line 7");
    }

    #[test]
    fn test_markdown_is_not_python() {
        assert!(syntax_error("```python\nx = 1\n```").is_some());
    }

    #[test]
    fn test_find_map_visits_in_order() {
        let tree = parse("a = 1\nb = 2\n").unwrap();
        let source = b"a = 1\nb = 2\n";
        let first = find_map(&tree, |node| {
            (node.kind() == "identifier").then(|| node_text(node, source).to_string())
        });
        assert_eq!(first.as_deref(), Some("a"));
    }
}
