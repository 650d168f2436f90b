//! Conversation model and the provider seam for chat-capable backends.
//!
//! A chat session is an append-only ordered sequence of [`ChatMessage`]s.
//! Providers receive message slices and return plain reply text; everything
//! provider-specific (turn formats, inline image encodings) stays behind the
//! [`ChatProvider`] trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::HeyMemeError;

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The human participant
    User,
    /// The language model participant
    Model,
    /// Instruction turn prepended by the session, never rendered
    System,
}

/// A single message in a chat conversation.
///
/// Messages are immutable once appended. A message may carry a meme image
/// URL (attached by the user, or fetched for a model reply that contained a
/// meme directive) and, for vision-capable calls, the base64-encoded JPEG
/// payload of that image.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Unique message id
    pub id: String,
    /// Who sent this message
    pub role: ChatRole,
    /// The text content, directive already stripped for model replies
    pub text: String,
    /// Optional meme image attached to the message
    pub meme_url: Option<String>,
    /// Base64-encoded JPEG payload for vision turns
    pub image_base64: Option<String>,
}

impl ChatMessage {
    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Create a new builder for a model message
    pub fn model() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Model)
    }

    /// Create a new builder for a system instruction turn
    pub fn system() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::System)
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    text: String,
    meme_url: Option<String>,
    image_base64: Option<String>,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with the specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            text: String::new(),
            meme_url: None,
            image_base64: None,
        }
    }

    /// Set the message text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attach a meme image URL
    pub fn meme_url(mut self, url: impl Into<String>) -> Self {
        self.meme_url = Some(url.into());
        self
    }

    /// Attach a base64-encoded JPEG payload for vision-capable calls
    pub fn image_base64(mut self, data: impl Into<String>) -> Self {
        self.image_base64 = Some(data.into());
        self
    }

    /// Build the ChatMessage with a fresh id
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            role: self.role,
            text: self.text,
            meme_url: self.meme_url,
            image_base64: self.image_base64,
        }
    }
}

/// Trait for providers that support chat-style interactions.
///
/// Implemented by the Gemini backend, the OpenAI-compatible fallback backend
/// and the relay client. The session layer only ever talks to this trait.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends a chat request with a sequence of messages.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation turns to send, oldest first
    ///
    /// # Returns
    ///
    /// The provider's raw reply text or an error
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, HeyMemeError>;
}
