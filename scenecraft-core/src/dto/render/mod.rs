//! Render DTOs
//!
//! Wire types for the render tool. The reply is a tagged envelope so that a
//! render the tool ran (successfully or not) can be told apart from the tool
//! itself reporting an error.

use serde::{Deserialize, Serialize};

use crate::domain::render::Quality;

/// Request to render a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Pre-validated Python source
    pub code: String,

    /// Scene class to render; the tool falls back to "Scene" when absent
    #[serde(default)]
    pub scene_name: Option<String>,

    #[serde(default)]
    pub quality: Quality,

    /// Resolution as `WIDTHxHEIGHT`; invalid values are ignored
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Result of a render the tool carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub success: bool,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

/// Envelope returned by the render tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderReply {
    /// The tool ran the engine; `success` says how that went
    Rendered(RenderResponse),
    /// The tool could not service the request
    Failed { message: String },
}
