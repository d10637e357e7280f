//! Configuration module
//!
//! Combines environment configuration with command-line overrides.

use scenecraft_core::domain::{Quality, Resolution};
use scenecraft_runner::RunnerConfig;

/// Settings that can be given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub render_server_url: Option<String>,
    pub quality: Option<String>,
    pub resolution: Option<String>,
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Execution backend settings
    pub runner: RunnerConfig,
}

impl Config {
    /// Loads runner settings from the environment and applies overrides
    pub fn load(overrides: Overrides) -> anyhow::Result<Self> {
        let runner = apply_overrides(RunnerConfig::from_env()?, overrides);
        runner.validate()?;
        Ok(Self { runner })
    }
}

fn apply_overrides(mut runner: RunnerConfig, overrides: Overrides) -> RunnerConfig {
    if let Some(url) = overrides.render_server_url.filter(|u| !u.trim().is_empty()) {
        runner.render_server_url = Some(url);
    }

    if let Some(quality) = overrides.quality {
        runner.quality = Quality::parse_or_default(&quality);
    }

    if let Some(resolution) = overrides.resolution {
        runner.resolution = Resolution::parse(&resolution);
    }

    runner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let runner = apply_overrides(
            RunnerConfig::default(),
            Overrides {
                render_server_url: Some("http://render:8090".to_string()),
                quality: Some("HIGH".to_string()),
                resolution: Some("1280x720".to_string()),
            },
        );

        assert_eq!(runner.render_server_url.as_deref(), Some("http://render:8090"));
        assert_eq!(runner.quality, Quality::High);
        assert_eq!(runner.resolution, Resolution::parse("1280,720"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let runner = apply_overrides(
            RunnerConfig::default(),
            Overrides {
                render_server_url: Some("  ".to_string()),
                quality: Some("ultra".to_string()),
                resolution: Some("wide".to_string()),
            },
        );

        assert_eq!(runner.render_server_url, None);
        assert_eq!(runner.quality, Quality::Medium);
        assert_eq!(runner.resolution, None);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let runner = apply_overrides(RunnerConfig::default(), Overrides::default());
        assert_eq!(runner.resolution, Resolution::parse("1920x1080"));
    }
}
