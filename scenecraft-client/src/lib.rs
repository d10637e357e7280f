//! Scenecraft HTTP Clients
//!
//! Typed HTTP clients for the two remote collaborators of the pipeline:
//! - [`RenderClient`] submits render requests to the render tool server
//! - [`ChatClient`] sends prompts to an OpenAI-compatible chat completion API
//!
//! # Example
//!
//! ```no_run
//! use scenecraft_client::RenderClient;
//! use scenecraft_core::domain::Quality;
//! use scenecraft_core::dto::render::RenderRequest;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RenderClient::new("http://localhost:8090", Duration::from_secs(320))?;
//!
//!     let reply = client.render(&RenderRequest {
//!         code: "from manim import *\n".to_string(),
//!         scene_name: None,
//!         quality: Quality::Low,
//!         resolution: None,
//!     }).await?;
//!
//!     println!("{:?}", reply);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod error;
mod render;

// Re-export commonly used types
pub use chat::{ChatClient, ChatConfig, ChatEndpoint, ChatRequest, TextGenerator};
pub use error::{ClientError, Result};

use reqwest::Client;
use std::time::Duration;

/// HTTP client for the render tool server
#[derive(Debug, Clone)]
pub struct RenderClient {
    /// Base URL of the render server (e.g., "http://localhost:8090")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl RenderClient {
    /// Create a new render client with a request timeout
    ///
    /// Connections are not pooled: calls may run on short-lived runtimes,
    /// and a pooled connection must not outlive the runtime that opened it.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the render server
    /// * `timeout` - Upper bound for a whole render request
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a new render client with a custom HTTP client
    ///
    /// # Example
    /// ```
    /// use scenecraft_client::RenderClient;
    ///
    /// let client = RenderClient::with_client("http://localhost:8090/", reqwest::Client::new());
    /// assert_eq!(client.base_url(), "http://localhost:8090");
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the render server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RenderClient::new("http://localhost:8090", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8090");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = RenderClient::new("http://localhost:8090/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8090");
    }
}
