//! Render endpoints

use reqwest::StatusCode;
use scenecraft_core::dto::render::{RenderReply, RenderRequest};
use tracing::debug;

use crate::RenderClient;
use crate::error::{ClientError, Result};

impl RenderClient {
    /// Submit a render request
    ///
    /// Any body that parses as a [`RenderReply`] is returned, whatever the
    /// status code, so callers can tell a tool-reported failure apart from
    /// a broken exchange. Everything else is an error.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderReply> {
        let url = format!("{}/render", self.base_url);
        debug!("Submitting render request to {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_reply(status, &body)
    }
}

/// Decode a render server response body
fn decode_reply(status: StatusCode, body: &str) -> Result<RenderReply> {
    match serde_json::from_str::<RenderReply>(body) {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(ClientError::api_error(status.as_u16(), body)),
        Err(e) => Err(ClientError::ParseError(format!(
            "Render reply does not match schema: {}",
            e
        ))),
    }
}
