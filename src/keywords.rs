//! Mood-to-keywords translation with provider fallback.
//!
//! Given a free-text mood description, asks the primary model for a short
//! keyword string shaped as JSON; degrades through raw-text cleanup, an
//! unstructured secondary-provider call, and finally the original query.
//! This step never surfaces an error: failure is absorbed silently so the
//! GIF search can always run with something.

use serde_json::json;

use crate::backends::{google, openai, Google, OpenAi};
use crate::chat::{ChatMessage, ChatProvider};
use crate::error::HeyMemeError;

/// Instruction shared by the primary and fallback paths.
const KEYWORD_INSTRUCTION: &str = "You are a meme keyword generator. Convert the user's \
emotional description or scenario into 2-3 precise, popular English keywords suitable for \
a GIF search engine (like Giphy). Output ONLY the keywords separated by spaces.";

/// Translates mood descriptions into GIF search keywords.
///
/// The primary provider is asked for a structured `{"keywords": "..."}`
/// reply; the optional fallback gets the same instruction as a plain-text
/// system prompt and returns an unstructured completion.
pub struct KeywordTranslator {
    primary: Box<dyn ChatProvider>,
    fallback: Option<Box<dyn ChatProvider>>,
}

impl KeywordTranslator {
    /// Creates a translator over explicit providers. The seam used by tests.
    pub fn new(primary: Box<dyn ChatProvider>, fallback: Option<Box<dyn ChatProvider>>) -> Self {
        Self { primary, fallback }
    }

    /// Creates the standard Gemini-primary / OpenAI-fallback translator.
    pub fn from_keys(google_api_key: &str, openai_api_key: Option<&str>) -> Self {
        let primary = Google::new(
            google_api_key,
            Some(google::DEFAULT_MODEL.to_string()),
            Some(0.7),
            Some(format!(
                "{} Return valid JSON: {{\"keywords\": \"...\"}}",
                KEYWORD_INSTRUCTION
            )),
        )
        .with_json_schema(json!({
            "type": "OBJECT",
            "properties": {
                "keywords": {
                    "type": "STRING",
                    "description": "2-3 keywords separated by spaces. Example: 'cat funny cute'"
                }
            },
            "required": ["keywords"]
        }));

        let fallback = openai_api_key.filter(|k| !k.is_empty()).map(|key| {
            Box::new(OpenAi::new(
                key,
                Some(openai::DEFAULT_MODEL.to_string()),
                Some(0.7),
                Some(KEYWORD_INSTRUCTION.to_string()),
            )) as Box<dyn ChatProvider>
        });

        Self {
            primary: Box::new(primary),
            fallback,
        }
    }

    /// Produces a keyword string for the given query, never an error.
    pub async fn translate(&self, query: &str) -> String {
        let message = ChatMessage::user().text(query).build();

        match self.primary.chat(std::slice::from_ref(&message)).await {
            Ok(reply) => extract_keywords(&reply, query),
            Err(err) => {
                log::warn!("Primary keyword translation failed: {}", err);
                match self.fallback_translate(&message, &err).await {
                    Some(keywords) => keywords,
                    None => query.to_string(),
                }
            }
        }
    }

    async fn fallback_translate(
        &self,
        message: &ChatMessage,
        primary_err: &HeyMemeError,
    ) -> Option<String> {
        if !primary_err.is_failover_eligible() {
            return None;
        }
        let fallback = self.fallback.as_ref()?;
        log::info!("Switching to backup keyword provider");
        match fallback.chat(std::slice::from_ref(message)).await {
            // The fallback answers in plain text; drop any quoting it added
            Ok(reply) => Some(reply.replace('"', "").trim().to_string()),
            Err(err) => {
                log::error!("Backup keyword provider failed too: {}", err);
                None
            }
        }
    }
}

/// Picks keywords out of a primary reply, degrading to cleaned raw text.
fn extract_keywords(reply: &str, query: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(reply) {
        Ok(value) => match value.get("keywords").and_then(|k| k.as_str()) {
            Some(keywords) => keywords.trim().to_string(),
            None => query.to_string(),
        },
        // Valid text but not JSON: strip code-fence markers and use as-is
        Err(_) => reply.replace("```json", "").replace("```", "").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;

    struct StaticProvider {
        reply: Result<String, fn() -> HeyMemeError>,
        calls: Arc<AtomicUsize>,
    }

    impl StaticProvider {
        fn ok(reply: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    reply: Ok(reply.to_string()),
                    calls: calls.clone(),
                },
                calls,
            )
        }

        fn failing(err: fn() -> HeyMemeError) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    reply: Err(err),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl ChatProvider for StaticProvider {
        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, HeyMemeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    #[tokio::test]
    async fn structured_reply_returns_trimmed_keywords() {
        let (primary, _) = StaticProvider::ok(r#"{"keywords": "  cat funny cute "}"#);
        let translator = KeywordTranslator::new(Box::new(primary), None);
        assert_eq!(translator.translate("when my cat judges me").await, "cat funny cute");
    }

    #[tokio::test]
    async fn non_json_reply_strips_code_fences() {
        let (primary, _) = StaticProvider::ok("```json\nmonday mood coffee\n```");
        let translator = KeywordTranslator::new(Box::new(primary), None);
        assert_eq!(translator.translate("monday").await, "monday mood coffee");
    }

    #[tokio::test]
    async fn json_without_keywords_field_returns_query() {
        let (primary, _) = StaticProvider::ok(r#"{"terms": "nope"}"#);
        let translator = KeywordTranslator::new(Box::new(primary), None);
        assert_eq!(translator.translate("original words").await, "original words");
    }

    #[tokio::test]
    async fn primary_failure_without_fallback_returns_query_unchanged() {
        let (primary, calls) =
            StaticProvider::failing(|| HeyMemeError::HttpError("connection refused".into()));
        let translator = KeywordTranslator::new(Box::new(primary), None);
        assert_eq!(translator.translate("me on monday").await, "me on monday");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn primary_failure_uses_fallback_and_strips_quotes() {
        let (primary, _) =
            StaticProvider::failing(|| HeyMemeError::RateLimited("RESOURCE_EXHAUSTED".into()));
        let (fallback, fallback_calls) = StaticProvider::ok("\"grumpy cat monday\"");
        let translator = KeywordTranslator::new(Box::new(primary), Some(Box::new(fallback)));
        assert_eq!(translator.translate("ugh, monday").await, "grumpy cat monday");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_failing_returns_query() {
        let (primary, _) = StaticProvider::failing(|| HeyMemeError::HttpError("down".into()));
        let (fallback, _) = StaticProvider::failing(|| HeyMemeError::HttpError("also down".into()));
        let translator = KeywordTranslator::new(Box::new(primary), Some(Box::new(fallback)));
        assert_eq!(translator.translate("help").await, "help");
    }

    #[tokio::test]
    async fn auth_failure_is_terminal_and_skips_fallback() {
        let (primary, _) = StaticProvider::failing(|| HeyMemeError::AuthError("bad key".into()));
        let (fallback, fallback_calls) = StaticProvider::ok("should not run");
        let translator = KeywordTranslator::new(Box::new(primary), Some(Box::new(fallback)));
        assert_eq!(translator.translate("query").await, "query");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }
}
