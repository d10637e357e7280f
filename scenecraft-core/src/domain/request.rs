//! Request domain types

use serde::{Deserialize, Serialize};

/// The user's original animation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub prompt: String,
}

impl Request {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// The request after elaboration into a storyboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedSpec {
    /// Prompt exactly as the user wrote it
    pub original_prompt: String,
    /// Structured description used to drive code generation
    pub description: String,
}
