//! Core domain types
//!
//! These types describe one pipeline run: the user's request, the refined
//! description, the generated script and the result of executing it. They are
//! shared between the pipeline (which sequences them) and the runner (which
//! executes artifacts).

pub mod artifact;
pub mod outcome;
pub mod render;
pub mod request;

pub use artifact::{CodeArtifact, DEFAULT_SCENE};
pub use outcome::{ExecutionOutcome, FailureKind};
pub use render::{Quality, Resolution};
pub use request::{RefinedSpec, Request};
