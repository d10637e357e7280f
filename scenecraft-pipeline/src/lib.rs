//! Scenecraft Pipeline
//!
//! Turns a natural-language animation request into a rendered video:
//! - [`generation`] asks a language model for scripts and cleans up its output
//! - [`pipeline`] runs the generate, execute and repair loop

pub mod generation;
pub mod pipeline;
pub mod prompts;

pub use generation::{
    CodeGenerationService, GenerationError, SceneGenerator, layout_risks, strip_code_fences,
};
pub use pipeline::{
    Decision, Pipeline, PipelineError, PipelineObserver, PipelineReport, PipelineState,
    PipelineStatus, Stage, TracingObserver, decide,
};
