//! Render settings
//!
//! Quality presets and output resolution as understood by the render engine.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Named output quality tier
///
/// Deserializes leniently through [`Quality::parse_or_default`], so unknown
/// or differently-cased names select the default preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    /// Parses a preset name, case-insensitively
    ///
    /// Unrecognized names select [`Quality::Medium`].
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Quality::Low,
            "medium" => Quality::Medium,
            "high" => Quality::High,
            _ => Quality::default(),
        }
    }

    /// Engine command-line flag for this preset
    pub fn flag(&self) -> &'static str {
        match self {
            Quality::Low => "-ql",
            Quality::Medium => "-qm",
            Quality::High => "-qh",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        }
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .map(Quality::parse_or_default)
            .unwrap_or_default())
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit output resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Parses `WIDTHxHEIGHT` or `WIDTH,HEIGHT`
    ///
    /// Both parts must be positive integers; anything else yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (width, height) = value
            .split_once(['x', 'X'])
            .or_else(|| value.split_once(','))?;

        let width: u32 = width.trim().parse().ok()?;
        let height: u32 = height.trim().parse().ok()?;

        if width == 0 || height == 0 {
            return None;
        }

        Some(Self { width, height })
    }

    /// Value passed to the engine's resolution flag
    pub fn as_engine_arg(&self) -> String {
        format!("{},{}", self.width, self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
