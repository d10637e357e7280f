//! Generation service
//!
//! Produces code artifacts with a language model:
//! - Refines the raw prompt into a storyboard
//! - Generates a script from the storyboard
//! - Repairs a script given the error text of a failed render
//!
//! Model output goes through the same post-processing every time: code fences
//! are stripped, syntax errors get one dedicated repair call, and scripts with
//! risky layout get a cleanup pass. Post-processing never makes a result
//! worse: any step that produces invalid Python is discarded.

use regex::Regex;
use scenecraft_client::{ChatRequest, ClientError, TextGenerator};
use scenecraft_core::domain::{CodeArtifact, RefinedSpec, Request};
use scenecraft_python::{extract_scene_name, syntax_error};
use scenecraft_runner::run_blocking;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::prompts;

/// Quoted `Text(...)` literals longer than this are a layout risk
const LONG_TEXT_CHARS: usize = 40;

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model call failed
    #[error("Language model request failed: {0}")]
    Model(#[from] ClientError),

    /// The model call could not be driven to completion
    #[error("Language model call could not run: {0}")]
    Runtime(String),
}

/// Produces storyboards and scripts
pub trait SceneGenerator: Send + Sync {
    /// Turns a raw request into a storyboard
    fn refine(&self, request: &Request) -> Result<RefinedSpec, GenerationError>;

    /// Writes a first script for a storyboard
    fn generate(&self, spec: &RefinedSpec) -> Result<CodeArtifact, GenerationError>;

    /// Writes a new script from a failed one and its error text
    fn repair(
        &self,
        spec: &RefinedSpec,
        prior: &CodeArtifact,
        error_text: &str,
    ) -> Result<CodeArtifact, GenerationError>;
}

/// Kinds of model calls, each with its own sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Refine,
    Generate,
    Fix,
    RepairSyntax,
    Normalize,
}

impl CallKind {
    fn temperature(self) -> f32 {
        match self {
            CallKind::Refine => 0.25,
            CallKind::Generate => 0.2,
            CallKind::Fix => 0.15,
            CallKind::RepairSyntax => 0.0,
            CallKind::Normalize => 0.1,
        }
    }

    fn max_tokens(self) -> u32 {
        match self {
            CallKind::Refine => 2500,
            CallKind::Normalize => 3000,
            CallKind::Generate | CallKind::Fix | CallKind::RepairSyntax => 4000,
        }
    }
}

/// Standard implementation of SceneGenerator
pub struct CodeGenerationService {
    model: Arc<dyn TextGenerator>,
}

impl CodeGenerationService {
    /// Creates a generation service over a text-generation collaborator
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    fn complete(
        &self,
        kind: CallKind,
        system: &str,
        user: String,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            system: system.to_string(),
            user,
            temperature: kind.temperature(),
            max_tokens: kind.max_tokens(),
        };

        debug!("Model call {:?}", kind);
        let reply = run_blocking(self.model.complete(&request))
            .map_err(|e| GenerationError::Runtime(format!("{:#}", e)))??;
        Ok(reply)
    }

    /// Returns syntactically valid code whenever possible
    ///
    /// Valid code is returned unchanged. Otherwise one repair call is made;
    /// if the repair is invalid too, a valid `fallback` wins, and failing that
    /// the original text is returned so execution reports the error.
    fn ensure_syntax_valid(
        &self,
        spec: &RefinedSpec,
        code: String,
        fallback: Option<&str>,
    ) -> Result<String, GenerationError> {
        let Some(issue) = syntax_error(&code) else {
            return Ok(code);
        };

        warn!("Generated code failed syntax check: {}", issue);
        let reply = self.complete(
            CallKind::RepairSyntax,
            prompts::REPAIR_SYNTAX_SYSTEM,
            prompts::repair_syntax(spec, &code, &issue.to_string()),
        )?;
        let repaired = strip_code_fences(&reply);

        match syntax_error(&repaired) {
            None => Ok(repaired),
            Some(issue) => {
                warn!("Syntax repair failed: {}", issue);
                match fallback {
                    Some(fallback) if syntax_error(fallback).is_none() => Ok(fallback.to_string()),
                    _ => Ok(code),
                }
            }
        }
    }

    /// Layout cleanup for code with layout risks
    ///
    /// Returns the input whenever cleanup fails or produces invalid code.
    fn normalize_layout(&self, spec: &RefinedSpec, code: &str) -> String {
        let risks = layout_risks(code);
        if risks.is_empty() {
            return code.to_string();
        }
        info!("Normalizing layout: {}", risks.join(", "));

        let relaxed = match self.complete(
            CallKind::Normalize,
            prompts::NORMALIZE_SYSTEM,
            prompts::normalize(spec, code),
        ) {
            Ok(reply) => strip_code_fences(&reply),
            Err(e) => {
                warn!("Layout normalization failed, keeping code: {}", e);
                return code.to_string();
            }
        };

        if syntax_error(&relaxed).is_some() {
            warn!("Layout normalization produced invalid Python, keeping code");
            return code.to_string();
        }

        if layout_risks(&relaxed).is_empty() {
            return relaxed;
        }

        let strict = match self.complete(
            CallKind::Normalize,
            prompts::NORMALIZE_STRICT_SYSTEM,
            prompts::normalize_strict(spec, &relaxed),
        ) {
            Ok(reply) => strip_code_fences(&reply),
            Err(e) => {
                warn!("Strict layout normalization failed, keeping code: {}", e);
                return code.to_string();
            }
        };

        if syntax_error(&strict).is_some() {
            warn!("Strict layout normalization produced invalid Python, keeping relaxed layout");
            return relaxed;
        }

        strict
    }

    /// Shared post-processing of a raw model reply
    fn finish(
        &self,
        spec: &RefinedSpec,
        reply: &str,
        fallback: Option<&str>,
    ) -> Result<CodeArtifact, GenerationError> {
        let code = self.ensure_syntax_valid(spec, strip_code_fences(reply), fallback)?;

        if syntax_error(&code).is_some() {
            return Ok(artifact(code, None));
        }

        let normalized = self.normalize_layout(spec, &code);
        let scene = extract_scene_name(&code);
        let code = self.ensure_syntax_valid(spec, normalized, Some(&code))?;
        Ok(artifact(code, scene))
    }
}

impl SceneGenerator for CodeGenerationService {
    fn refine(&self, request: &Request) -> Result<RefinedSpec, GenerationError> {
        let description = self.complete(
            CallKind::Refine,
            prompts::REFINE_SYSTEM,
            prompts::refine(&request.prompt),
        )?;

        Ok(RefinedSpec {
            original_prompt: request.prompt.clone(),
            description: description.trim().to_string(),
        })
    }

    fn generate(&self, spec: &RefinedSpec) -> Result<CodeArtifact, GenerationError> {
        let reply = self.complete(
            CallKind::Generate,
            prompts::GENERATE_SYSTEM,
            prompts::generate(spec),
        )?;
        self.finish(spec, &reply, None)
    }

    fn repair(
        &self,
        spec: &RefinedSpec,
        prior: &CodeArtifact,
        error_text: &str,
    ) -> Result<CodeArtifact, GenerationError> {
        let reply = self.complete(
            CallKind::Fix,
            prompts::FIX_SYSTEM,
            prompts::fix(spec, &prior.code, error_text),
        )?;
        self.finish(spec, &reply, Some(&prior.code))
    }
}

/// Builds an artifact, keeping `previous_scene` when the code names none
fn artifact(code: String, previous_scene: Option<String>) -> CodeArtifact {
    let scene = extract_scene_name(&code).or(previous_scene);
    CodeArtifact::new(code, scene)
}

/// Removes a surrounding markdown code fence
///
/// # Example
/// ```
/// use scenecraft_pipeline::generation::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```python\nx = 1\n```"), "x = 1");
/// assert_eq!(strip_code_fences("x = 1"), "x = 1");
/// ```
pub fn strip_code_fences(text: &str) -> String {
    let mut code = text.trim();

    for opening in ["```python", "```py", "```"] {
        if let Some(rest) = code.strip_prefix(opening) {
            code = rest;
            break;
        }
    }

    if let Some(rest) = code.strip_suffix("```") {
        code = rest;
    }

    code.trim().to_string()
}

/// Describes the layout risks found in a script; empty when there are none
pub fn layout_risks(code: &str) -> Vec<&'static str> {
    let patterns = [
        (r"move_to\(\s*[\[\(]\s*-?\d", "absolute move_to coordinates"),
        (r"\.shift\(\s*[\[\(]\s*-?\d", "numeric shift vector"),
        (r"\bset_[xy]\(", "set_x/set_y positioning"),
        (r"np\.array\(", "np.array positions"),
        (r"SVGMobject|ImageMobject", "external assets"),
    ];

    let mut risks: Vec<&'static str> = patterns
        .into_iter()
        .filter(|(pattern, _)| Regex::new(pattern).is_ok_and(|re| re.is_match(code)))
        .map(|(_, risk)| risk)
        .collect();

    if has_long_text(code) {
        risks.push("long Text literal");
    }

    risks
}

fn has_long_text(code: &str) -> bool {
    let literals = [r#"Text\(\s*"([^"]*)""#, r#"Text\(\s*'([^']*)'"#];

    literals
        .into_iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .any(|re| {
            code.lines()
                .flat_map(|line| re.captures_iter(line))
                .any(|caps| caps[1].chars().count() > LONG_TEXT_CHARS)
        })
}
