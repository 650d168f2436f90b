//! Google Gemini API client implementation.
//!
//! This module provides integration with Google's Gemini models through the
//! `generateContent` endpoint. It supports system instructions, conversation
//! history, inline JPEG image parts for vision turns, and JSON-schema
//! constrained replies for the keyword-translation path.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatMessage, ChatProvider, ChatRole};
use crate::error::HeyMemeError;

/// Default model used by both the keyword translator and the chat path.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for interacting with Google's Gemini API.
///
/// Holds the configuration and state needed to make `generateContent`
/// requests. Implements [`ChatProvider`].
pub struct Google {
    /// API key for authentication with Google's API
    pub api_key: String,
    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: String,
    /// Sampling temperature between 0.0 and 1.0
    pub temperature: Option<f32>,
    /// Optional system instruction, sent as the leading user turn
    pub system: Option<String>,
    /// MIME type requested for the reply (e.g. "application/json")
    pub response_mime_type: Option<String>,
    /// JSON schema constraining the reply when a MIME type is set
    pub response_schema: Option<Value>,
    /// HTTP client for making API requests
    client: Client,
}

/// Request body for content generation
#[derive(Serialize)]
struct GoogleChatRequest<'a> {
    /// List of conversation turns
    contents: Vec<GoogleContent<'a>>,
    /// Optional generation parameters
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GoogleGenerationConfig<'a>>,
}

/// Individual turn in a conversation
#[derive(Serialize)]
struct GoogleContent<'a> {
    /// Role of the turn's author ("user" or "model")
    role: &'a str,
    /// Content parts of the turn
    parts: Vec<GooglePart<'a>>,
}

/// A part of a turn: plain text or inline image data
#[derive(Serialize)]
#[serde(untagged)]
enum GooglePart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GoogleInlineData<'a>,
    },
}

/// Base64-encoded inline media
#[derive(Serialize)]
struct GoogleInlineData<'a> {
    data: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
}

/// Configuration parameters for generation
#[derive(Serialize)]
struct GoogleGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "responseMimeType")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "responseSchema")]
    response_schema: Option<&'a Value>,
}

/// Response from the content generation API
#[derive(Deserialize)]
struct GoogleChatResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

/// Individual completion candidate
#[derive(Deserialize)]
struct GoogleCandidate {
    content: GoogleResponseContent,
}

/// Content block within a response
#[derive(Deserialize)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

/// Individual part of response content
#[derive(Deserialize)]
struct GoogleResponsePart {
    #[serde(default)]
    text: String,
}

impl Google {
    /// Creates a new Gemini client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google API key for authentication
    /// * `model` - Model identifier (defaults to [`DEFAULT_MODEL`])
    /// * `temperature` - Sampling temperature between 0.0 and 1.0
    /// * `system` - System instruction to set context
    pub fn new(
        api_key: impl Into<String>,
        model: Option<String>,
        temperature: Option<f32>,
        system: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            system,
            response_mime_type: None,
            response_schema: None,
            client: Client::new(),
        }
    }

    /// Constrains replies to JSON matching the given schema.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }
}

#[async_trait]
impl ChatProvider for Google {
    /// Sends a chat request to Google's Gemini API.
    ///
    /// The system instruction, when present, is sent as the leading user
    /// turn. Messages carrying an inline image get a second, `inlineData`
    /// part (JPEG).
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, HeyMemeError> {
        if self.api_key.is_empty() {
            return Err(HeyMemeError::AuthError("Missing Google API key".to_string()));
        }

        let mut contents = Vec::new();

        if let Some(system) = &self.system {
            contents.push(GoogleContent {
                role: "user",
                parts: vec![GooglePart::Text { text: system }],
            });
        }

        for msg in messages {
            let mut parts = vec![GooglePart::Text { text: &msg.text }];
            if let Some(image) = &msg.image_base64 {
                parts.push(GooglePart::InlineData {
                    inline_data: GoogleInlineData {
                        data: image,
                        mime_type: "image/jpeg",
                    },
                });
            }
            contents.push(GoogleContent {
                // Gemini has no system role in contents; instructions ride
                // as user turns.
                role: match msg.role {
                    ChatRole::User | ChatRole::System => "user",
                    ChatRole::Model => "model",
                },
                parts,
            });
        }

        let generation_config = if self.temperature.is_none()
            && self.response_mime_type.is_none()
            && self.response_schema.is_none()
        {
            None
        } else {
            Some(GoogleGenerationConfig {
                temperature: self.temperature,
                response_mime_type: self.response_mime_type.as_deref(),
                response_schema: self.response_schema.as_ref(),
            })
        };

        let req_body = GoogleChatRequest {
            contents,
            generation_config,
        };

        let url = format!(
            "{base}/{model}:generateContent?key={key}",
            base = BASE_URL,
            model = self.model,
            key = self.api_key
        );

        let resp = self.client.post(&url).json(&req_body).send().await?;
        let status = resp.status();
        log::debug!("Gemini HTTP status: {}", status);

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), error_text));
        }

        let json_resp: GoogleChatResponse = resp.json().await?;
        let first_candidate = json_resp.candidates.into_iter().next().ok_or_else(|| {
            HeyMemeError::ProviderError("No candidates returned by Gemini".to_string())
        })?;

        let text = first_candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(HeyMemeError::ProviderError(
                "Empty reply from Gemini".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Maps an upstream HTTP failure onto the error taxonomy.
///
/// 429 (and RESOURCE_EXHAUSTED bodies) are the quota class that drives
/// provider failover; 400 is a malformed request (typically a bad inline
/// image); 401/403 are credential failures and terminal.
pub(crate) fn classify_http_failure(status: u16, body: String) -> HeyMemeError {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        HeyMemeError::RateLimited(format!("Status {}: {}", status, body))
    } else if status == 400 {
        HeyMemeError::InvalidRequest(format!("Status 400: {}", body))
    } else if status == 401 || status == 403 {
        HeyMemeError::AuthError(format!("Status {}: {}", status, body))
    } else {
        HeyMemeError::ProviderError(format!("Status {}: {}", status, body))
    }
}
