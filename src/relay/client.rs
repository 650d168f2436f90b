//! Client side of the relay, the session's primary chat path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::RelayRequest;
use crate::backends::google::classify_http_failure;
use crate::chat::{ChatMessage, ChatProvider};
use crate::error::HeyMemeError;

/// Talks to a relay server's `POST /api/chat` endpoint.
///
/// The relay holds the primary provider's credential, so this client needs
/// none. Each turn carries only the persona instruction and the current
/// message; the relay is stateless and performs no retry.
pub struct RelayClient {
    /// Base URL of the relay server (e.g. "http://127.0.0.1:8080")
    pub base_url: String,
    /// Persona instruction sent with every turn
    pub system_instruction: String,
    /// HTTP client for making requests
    client: Client,
}

/// The slice of the upstream response the client needs
#[derive(Deserialize)]
struct UpstreamResponse {
    #[serde(default)]
    candidates: Vec<UpstreamCandidate>,
}

#[derive(Deserialize)]
struct UpstreamCandidate {
    content: UpstreamContent,
}

#[derive(Deserialize)]
struct UpstreamContent {
    #[serde(default)]
    parts: Vec<UpstreamPart>,
}

#[derive(Deserialize)]
struct UpstreamPart {
    #[serde(default)]
    text: String,
}

impl RelayClient {
    /// Creates a client for the given relay and persona instruction.
    pub fn new(base_url: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            system_instruction: system_instruction.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatProvider for RelayClient {
    /// Sends the current turn through the relay.
    ///
    /// Only the most recent message travels; the relay carries no history.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, HeyMemeError> {
        let current = messages.last().ok_or_else(|| {
            HeyMemeError::InvalidRequest("No message to send through the relay".to_string())
        })?;

        let body = RelayRequest {
            system_instruction: Some(self.system_instruction.clone()),
            message: Some(current.text.clone()),
            image_base64: current.image_base64.clone(),
        };

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("Relay HTTP status: {}", status);

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), error_text));
        }

        let upstream: UpstreamResponse = resp.json().await?;
        let text: String = upstream
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(HeyMemeError::ProviderError(
                "Empty reply through the relay".to_string(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_reply_text_is_joined_from_parts() {
        let upstream: UpstreamResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "no cap. "}, {"text": "[MEME: vibes]"}]}}]}"#,
        )
        .unwrap();
        let text: String = upstream
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        assert_eq!(text, "no cap. [MEME: vibes]");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let upstream: UpstreamResponse = serde_json::from_str(r#"{"error": {"code": 429}}"#).unwrap();
        assert!(upstream.candidates.is_empty());
    }
}
