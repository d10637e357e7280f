//! Primary render transport
//!
//! The backend first tries to render through the render server. Failures are
//! split into two classes: the server explicitly reporting that the render
//! failed (surfaced to the caller as is) and everything else, which sends the
//! backend to its local fallback.

use async_trait::async_trait;
use scenecraft_client::{ClientError, RenderClient};
use scenecraft_core::dto::render::{RenderReply, RenderRequest, RenderResponse};
use thiserror::Error;

/// Render transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server could not be reached or did not answer in time
    #[error("Render server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with something that is not a render reply
    #[error("Unexpected render server response: {0}")]
    Protocol(String),

    /// The server processed the request and reported a failure
    #[error("{0}")]
    Application(String),
}

impl TransportError {
    /// Whether the local fallback should be attempted
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, TransportError::Application(_))
    }
}

/// Sends a render request to a remote renderer
#[async_trait]
pub trait RenderTransport: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, TransportError>;
}

#[async_trait]
impl RenderTransport for RenderClient {
    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse, TransportError> {
        match RenderClient::render(self, request).await {
            Ok(RenderReply::Rendered(response)) => Ok(response),
            Ok(RenderReply::Failed { message }) => Err(TransportError::Application(message)),
            Err(e) => Err(classify(e)),
        }
    }
}

fn classify(error: ClientError) -> TransportError {
    match error {
        ClientError::RequestFailed(e) => TransportError::Unreachable(e.to_string()),
        ClientError::ApiError { status, message } => {
            TransportError::Protocol(format!("HTTP {}: {}", status, message))
        }
        ClientError::ParseError(message) | ClientError::InvalidRequest(message) => {
            TransportError::Protocol(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_application_errors_block_fallback() {
        assert!(TransportError::Unreachable("refused".into()).allows_fallback());
        assert!(TransportError::Protocol("bad json".into()).allows_fallback());
        assert!(!TransportError::Application("NameError".into()).allows_fallback());
    }

    #[test]
    fn test_api_error_is_protocol() {
        let error = classify(ClientError::api_error(502, "bad gateway"));
        assert!(matches!(error, TransportError::Protocol(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 9 (discard) is closed on test machines
        let client = RenderClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = RenderRequest {
            code: "x = 1\n".to_string(),
            scene_name: None,
            quality: Default::default(),
            resolution: None,
        };

        let error = RenderTransport::render(&client, &request).await.unwrap_err();
        assert!(matches!(error, TransportError::Unreachable(_)));
        assert!(error.allows_fallback());
    }
}
