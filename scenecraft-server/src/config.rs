//! Server configuration

use scenecraft_runner::RunnerConfig;

/// Render server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8090")
    pub bind_addr: String,

    /// Engine and work directory settings
    pub runner: RunnerConfig,
}

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SCENECRAFT_SERVER_BIND_ADDR (optional, default: 0.0.0.0:8090)
    /// - everything read by [`RunnerConfig::from_env`]
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("SCENECRAFT_SERVER_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8090".to_string());

        let mut runner = RunnerConfig::from_env()?;
        // The server is the render endpoint; it never forwards to another one
        runner.render_server_url = None;

        Ok(Self { bind_addr, runner })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        self.runner.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let mut config = ServerConfig {
            bind_addr: "127.0.0.1:8090".to_string(),
            runner: RunnerConfig::default(),
        };
        assert!(config.validate().is_ok());

        config.bind_addr = String::new();
        assert!(config.validate().is_err());
    }
}
