//! Chat completion client
//!
//! The pipeline only needs "text in, text out" from a language model. That
//! contract is the [`TextGenerator`] trait; [`ChatClient`] implements it for
//! OpenAI-compatible APIs, including Azure OpenAI deployments.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// One prompt sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-generation collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's reply, trimmed
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Where chat requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEndpoint {
    /// OpenAI or any server exposing `/chat/completions`
    OpenAi { base_url: String },
    /// Azure OpenAI deployment
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

/// Chat client configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub endpoint: ChatEndpoint,
    pub model: String,
    pub timeout: Duration,
}

impl ChatConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - AZURE_OPENAI_API_KEY or OPENAI_API_KEY (required)
    /// - AZURE_OPENAI_ENDPOINT (optional, selects Azure mode)
    /// - AZURE_OPENAI_DEPLOYMENT (required in Azure mode)
    /// - AZURE_OPENAI_API_VERSION (optional, default: 2024-02-15-preview)
    /// - OPENAI_BASE_URL (optional, default: https://api.openai.com/v1)
    /// - OPENAI_MODEL (optional, default: deployment name or gpt-4.1-mini)
    /// - LLM_TIMEOUT (optional, seconds, default: 120)
    pub fn from_env() -> anyhow::Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let api_key = var("AZURE_OPENAI_API_KEY")
            .or_else(|| var("OPENAI_API_KEY"))
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let model_override = var("OPENAI_MODEL");

        let (endpoint, model) = match var("AZURE_OPENAI_ENDPOINT") {
            Some(endpoint) => {
                let deployment = var("AZURE_OPENAI_DEPLOYMENT").ok_or_else(|| {
                    anyhow::anyhow!(
                        "AZURE_OPENAI_DEPLOYMENT must be set with AZURE_OPENAI_ENDPOINT"
                    )
                })?;
                let api_version = var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string());
                let model = model_override.unwrap_or_else(|| deployment.clone());
                (
                    ChatEndpoint::Azure {
                        endpoint,
                        deployment,
                        api_version,
                    },
                    model,
                )
            }
            None => {
                let base_url =
                    var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
                let model = model_override.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
                (ChatEndpoint::OpenAi { base_url }, model)
            }
        };

        let timeout = var("LLM_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));

        Ok(Self {
            api_key,
            endpoint,
            model,
            timeout,
        })
    }
}

/// Client for OpenAI-compatible chat completion APIs
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ChatConfig,
    client: Client,
}

impl ChatClient {
    /// Creates a chat client
    ///
    /// Connections are not pooled, for the same reason as in
    /// [`crate::RenderClient::new`].
    pub fn new(config: ChatConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::InvalidRequest("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self { config, client })
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Full URL of the chat completion endpoint
    pub fn completions_url(&self) -> String {
        match &self.config.endpoint {
            ChatEndpoint::OpenAi { base_url } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            ChatEndpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                api_version
            ),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.endpoint {
            ChatEndpoint::OpenAi { .. } => builder.bearer_auth(&self.config.api_key),
            ChatEndpoint::Azure { .. } => builder.header("api-key", &self.config.api_key),
        }
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = self.completions_url();
        let body = CompletionBody::new(&self.config.model, request);

        debug!(
            "Sending chat completion: model={}, prompt_len={}",
            self.config.model,
            request.user.len()
        );

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse completion: {}", e)))?;

        completion.into_text()
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> CompletionBody<'a> {
    fn new(model: &'a str, request: &'a ChatRequest) -> Self {
        Self {
            model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ClientError::ParseError("Model returned no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: ChatEndpoint) -> ChatConfig {
        ChatConfig {
            api_key: "test-key".to_string(),
            endpoint,
            model: "test-model".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_openai_url() {
        let client = ChatClient::new(config(ChatEndpoint::OpenAi {
            base_url: "https://api.example.com/v1/".to_string(),
        }))
        .unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_azure_url() {
        let client = ChatClient::new(config(ChatEndpoint::Azure {
            endpoint: "https://example.openai.azure.com".to_string(),
            deployment: "gpt4".to_string(),
            api_version: "2024-02-15-preview".to_string(),
        }))
        .unwrap();
        assert_eq!(
            client.completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt4/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut cfg = config(ChatEndpoint::OpenAi {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        });
        cfg.api_key = "  ".to_string();
        assert!(matches!(
            ChatClient::new(cfg),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_body_serialization() {
        let request = ChatRequest {
            system: "be brief".to_string(),
            user: "hello".to_string(),
            temperature: 0.5,
            max_tokens: 10,
        };
        let json = serde_json::to_value(CompletionBody::new("m", &request)).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_response_text_is_trimmed() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  x = 1\n "}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "x = 1");
    }

    #[test]
    fn test_empty_response_is_error() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(response.into_text().is_err());

        let response: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(response.into_text().is_err());
    }
}
