//! Safety policies
//!
//! A policy looks at one construct at a time and decides whether it may
//! appear in a generated script. Tree traversal lives in the validator, so
//! denylists can be extended or replaced without touching it.
//!
//! This is a static filter, not a sandbox. Access paths assembled at runtime
//! (`getattr`, string building, aliasing through other objects) are not seen.

use std::collections::BTreeSet;

/// Modules that give access to the process, filesystem, network, native
/// code, concurrency or the import machinery
const DENIED_MODULES: &[&str] = &[
    "os",
    "sys",
    "subprocess",
    "shutil",
    "pathlib",
    "socket",
    "requests",
    "urllib",
    "http",
    "ftplib",
    "ctypes",
    "multiprocessing",
    "threading",
    "asyncio",
    "importlib",
    "builtins",
];

/// Builtins that execute code, open files or read input
const DENIED_CALLS: &[&str] = &[
    "exec",
    "eval",
    "compile",
    "open",
    "__import__",
    "input",
    "breakpoint",
];

/// The interpreter's builtin namespace object
const BUILTINS_OBJECT: &str = "__builtins__";

/// A construct the validator asks the policy about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// `import a.b` or `from a.b import c`; holds the root segment of each module
    Import { modules: Vec<String> },
    /// A call expression
    Call {
        /// Set when the callee is a bare name, e.g. `eval` in `eval(x)`
        callee: Option<String>,
        /// Base identifier of the callee's attribute chain, e.g. `os` in `os.path.join(..)`
        root: Option<String>,
    },
}

/// Policy decision for one construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Decides whether a construct may appear in a script
pub trait SafetyPolicy: Send + Sync {
    fn check(&self, node: &SyntaxNode) -> Verdict;
}

/// Allow-by-default policy that denies listed modules and calls
#[derive(Debug, Clone)]
pub struct DenylistPolicy {
    modules: BTreeSet<String>,
    calls: BTreeSet<String>,
    call_roots: BTreeSet<String>,
}

impl DenylistPolicy {
    /// Creates a policy that denies nothing
    pub fn empty() -> Self {
        Self {
            modules: BTreeSet::new(),
            calls: BTreeSet::new(),
            call_roots: BTreeSet::new(),
        }
    }

    /// Denies importing a module and calling through it
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        self.call_roots.insert(module.clone());
        self.modules.insert(module);
        self
    }

    /// Denies calling a bare name
    pub fn with_call(mut self, name: impl Into<String>) -> Self {
        self.calls.insert(name.into());
        self
    }

    /// Denies calls whose attribute chain starts at `root`
    pub fn with_call_root(mut self, root: impl Into<String>) -> Self {
        self.call_roots.insert(root.into());
        self
    }
}

impl Default for DenylistPolicy {
    fn default() -> Self {
        let policy = DENIED_MODULES
            .iter()
            .fold(Self::empty(), |policy, module| policy.with_module(*module));

        DENIED_CALLS
            .iter()
            .fold(policy, |policy, call| policy.with_call(*call))
            .with_call_root(BUILTINS_OBJECT)
    }
}

impl SafetyPolicy for DenylistPolicy {
    fn check(&self, node: &SyntaxNode) -> Verdict {
        match node {
            SyntaxNode::Import { modules } => {
                match modules.iter().find(|m| self.modules.contains(*m)) {
                    Some(module) => {
                        Verdict::Deny(format!("Blocked import detected: '{}'.", module))
                    }
                    None => Verdict::Allow,
                }
            }
            SyntaxNode::Call { callee, root } => {
                if let Some(name) = callee.as_ref().filter(|c| self.calls.contains(*c)) {
                    return Verdict::Deny(format!("Blocked function call detected: '{}()'.", name));
                }
                if let Some(root) = root.as_ref().filter(|r| self.call_roots.contains(*r)) {
                    return Verdict::Deny(format!("Blocked call root detected: '{}'.", root));
                }
                Verdict::Allow
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(module: &str) -> SyntaxNode {
        SyntaxNode::Import {
            modules: vec![module.to_string()],
        }
    }

    fn call(callee: Option<&str>, root: Option<&str>) -> SyntaxNode {
        SyntaxNode::Call {
            callee: callee.map(str::to_string),
            root: root.map(str::to_string),
        }
    }

    #[test]
    fn test_default_denies_capability_modules() {
        let policy = DenylistPolicy::default();
        for module in DENIED_MODULES {
            assert!(!policy.check(&import(module)).is_allowed(), "{module}");
        }
        assert!(policy.check(&import("manim")).is_allowed());
        assert!(policy.check(&import("numpy")).is_allowed());
    }

    #[test]
    fn test_default_denies_dynamic_execution() {
        let policy = DenylistPolicy::default();
        assert_eq!(
            policy.check(&call(Some("eval"), Some("eval"))),
            Verdict::Deny("Blocked function call detected: 'eval()'.".to_string())
        );
        assert!(policy.check(&call(Some("Text"), Some("Text"))).is_allowed());
    }

    #[test]
    fn test_default_denies_builtins_root() {
        let policy = DenylistPolicy::default();
        assert_eq!(
            policy.check(&call(None, Some("__builtins__"))),
            Verdict::Deny("Blocked call root detected: '__builtins__'.".to_string())
        );
        assert!(policy.check(&call(None, Some("self"))).is_allowed());
        assert!(policy.check(&call(None, None)).is_allowed());
    }

    #[test]
    fn test_policy_can_be_extended() {
        let policy = DenylistPolicy::default()
            .with_module("numpy")
            .with_call("getattr");

        assert!(!policy.check(&import("numpy")).is_allowed());
        assert!(!policy.check(&call(None, Some("numpy"))).is_allowed());
        assert!(!policy.check(&call(Some("getattr"), Some("getattr"))).is_allowed());
    }

    #[test]
    fn test_empty_policy_allows_everything() {
        let policy = DenylistPolicy::empty();
        assert!(policy.check(&import("os")).is_allowed());
        assert!(policy.check(&call(Some("eval"), Some("eval"))).is_allowed());
    }
}
