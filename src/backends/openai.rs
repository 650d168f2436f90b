//! OpenAI-compatible chat-completions client, used as the failover provider.
//!
//! Gemini stays the primary for both keyword translation and chat; this
//! backend only sees traffic after a failover-eligible primary failure. It
//! speaks the plain chat-completions format with a bearer credential and no
//! structured output, so the fallback path never depends on JSON parsing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatProvider, ChatRole};
use crate::error::HeyMemeError;

use super::google::classify_http_failure;

/// Default fallback model: fast, cheap, capable enough for meme duty.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAi {
    /// API key sent as a bearer credential
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature between 0.0 and 1.0
    pub temperature: Option<f32>,
    /// Optional system prompt, prepended as a system turn
    pub system: Option<String>,
    /// Base URL, overridable for compatible providers
    pub base_url: String,
    /// HTTP client for making API requests
    client: Client,
}

/// Request body for chat completions
#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A single turn in the chat-completions wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct OpenAiMessage {
    pub role: String,
    pub content: String,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Builds the wire-format turn list: the system prompt first (when present),
/// then the conversation. User turns that carried an image are rewritten as
/// `[User sent an image: url] text` since this endpoint gets no inline media.
pub(crate) fn to_wire_messages(
    system: Option<&str>,
    messages: &[ChatMessage],
) -> Vec<OpenAiMessage> {
    let mut wire = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = system {
        wire.push(OpenAiMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    for msg in messages {
        let role = match msg.role {
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
            ChatRole::System => "system",
        };
        let content = match (&msg.role, &msg.meme_url) {
            (ChatRole::User, Some(url)) => {
                format!("[User sent an image: {}] {}", url, msg.text)
            }
            _ => msg.text.clone(),
        };
        wire.push(OpenAiMessage {
            role: role.to_string(),
            content,
        });
    }
    wire
}

impl OpenAi {
    /// Creates a new OpenAI-compatible client.
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        temperature: Option<f32>,
        system: Option<String>,
    ) -> Self {
        Self {
            // Pasted keys routinely carry stray whitespace
            api_key: api_key.into().trim().to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            system,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Overrides the base URL for OpenAI-compatible providers.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAi {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing OpenAI API key".to_string()));
        }

        let req_body = OpenAiChatRequest {
            model: &self.model,
            messages: to_wire_messages(self.system.as_deref(), messages),
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = resp.status();
        log::debug!("OpenAI HTTP status: {}", status);

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), error_text));
        }

        let json_resp: OpenAiChatResponse = resp.json().await?;
        json_resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HeyMemeError::ProviderError("Empty reply from OpenAI".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_messages_prepend_system_turn() {
        let history = [
            ChatMessage::user().text("hi").build(),
            ChatMessage::model().text("who asked?").build(),
        ];
        let wire = to_wire_messages(Some("You are a troll."), &history);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "You are a troll.");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[2].role, "assistant");
        assert_eq!(wire[2].content, "who asked?");
    }

    #[test]
    fn system_role_messages_become_system_turns() {
        let history = [
            ChatMessage::system().text("You are a troll.").build(),
            ChatMessage::user().text("hi").build(),
        ];
        let wire = to_wire_messages(None, &history);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "You are a troll.");
        assert_eq!(wire[1].role, "user");
    }

    #[test]
    fn user_image_turns_are_rewritten() {
        let history = [ChatMessage::user()
            .text("rate my meme")
            .meme_url("https://media.giphy.com/media/x/giphy.gif")
            .build()];
        let wire = to_wire_messages(None, &history);
        assert_eq!(
            wire[0].content,
            "[User sent an image: https://media.giphy.com/media/x/giphy.gif] rate my meme"
        );
    }

    #[test]
    fn model_image_turns_keep_plain_text() {
        let history = [ChatMessage::model()
            .text("here you go")
            .meme_url("https://media.giphy.com/media/y/200.gif")
            .build()];
        let wire = to_wire_messages(None, &history);
        assert_eq!(wire[0].content, "here you go");
    }

    #[test]
    fn api_key_is_trimmed() {
        let client = OpenAi::new("  sk-test \n", None, None, None);
        assert_eq!(client.api_key, "sk-test");
    }

    #[test]
    fn response_extracts_first_choice() {
        let resp: OpenAiChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "bet"}}]}"#,
        )
        .unwrap();
        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("bet"));
    }
}
