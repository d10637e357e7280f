//! Scenecraft Python Infrastructure
//!
//! Static analysis of generated Python scripts. Nothing in this crate runs
//! Python; it parses the source and inspects the syntax tree.
//! It includes:
//! - Parsing and syntax checking
//! - A pluggable safety policy and the validator that applies it
//! - Scene identifier extraction

pub mod error;
mod indent;
pub mod parser;
pub mod policy;
pub mod scene;
pub mod validator;

pub use error::UnsafeCodeError;
pub use parser::{SyntaxIssue, syntax_error};
pub use policy::{DenylistPolicy, SafetyPolicy, SyntaxNode, Verdict};
pub use scene::{artifact_from_source, extract_scene_name};
pub use validator::{Validator, validate};
