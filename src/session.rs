//! Chat turn state machine.
//!
//! A turn runs: optimistic append of the user's message, one primary call,
//! on a failover-eligible failure one fallback call over reconstructed
//! history, then directive parsing and an optional random-GIF lookup for the
//! reply. A turn always runs to completion or to a terminal, categorized
//! error message; there is no cancellation, no timeout control and no retry.
//! Exclusive access (`&mut self`) keeps at most one turn outstanding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::chat::{ChatMessage, ChatProvider};
use crate::directive::{find_image_url, parse_reply};
use crate::error::HeyMemeError;
use crate::gif::GiphyClient;
use crate::persona::Persona;

/// How many history turns the fallback reconstruction carries, not counting
/// the persona instruction prepended as the first turn.
pub const FALLBACK_HISTORY_LIMIT: usize = 10;

/// Result of one completed chat turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The model message appended for this turn (a reply or an error notice)
    pub message: ChatMessage,
    /// Whether the backup provider answered the turn
    pub used_backup: bool,
    /// Whether the turn ended in a terminal error
    pub is_error: bool,
}

/// One persona chat session: the persona, the append-only history and the
/// provider pair. Dropped wholesale when the user returns to persona
/// selection.
pub struct ChatSession {
    persona: &'static Persona,
    primary: Box<dyn ChatProvider>,
    fallback: Option<Box<dyn ChatProvider>>,
    giphy: Option<GiphyClient>,
    history: Vec<ChatMessage>,
    /// Ids of error notices, excluded from fallback reconstruction
    error_ids: Vec<String>,
    http: reqwest::Client,
}

impl ChatSession {
    /// Creates a session over explicit providers. The seam used by tests.
    ///
    /// The primary provider must carry the persona's instruction itself
    /// (it receives only the current turn). The fallback provider need not:
    /// the session prepends the instruction to every fallback payload.
    /// The persona's welcome line is appended as the opening model message.
    pub fn new(
        persona: &'static Persona,
        primary: Box<dyn ChatProvider>,
        fallback: Option<Box<dyn ChatProvider>>,
        giphy: Option<GiphyClient>,
    ) -> Self {
        let welcome = ChatMessage::model().text(persona.welcome).build();
        Self {
            persona,
            primary,
            fallback,
            giphy,
            history: vec![welcome],
            error_ids: Vec::new(),
            http: reqwest::Client::new(),
        }
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    /// The full message sequence, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Runs one chat turn for the given user text.
    ///
    /// Never returns an error: terminal failures are rendered as categorized
    /// model messages in the history, as the outcome reports.
    pub async fn send(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();

        // Optimistic append, image URL detected up front without waiting
        // for confirmation that it is reachable.
        let meme_url = find_image_url(text);
        let mut user_message = ChatMessage::user().text(text).build();
        user_message.meme_url = meme_url.clone();

        let mut download_failed = false;
        if let Some(url) = &meme_url {
            match self.fetch_image_base64(url).await {
                Ok(data) => user_message.image_base64 = Some(data),
                Err(e) => {
                    log::warn!("Could not download attached image {}: {}", url, e);
                    download_failed = true;
                }
            }
        }

        // The transcript keeps the user's own words; only the prompt sent to
        // the model carries the download-failure notice.
        self.history.push(user_message.clone());
        let mut outbound = user_message;
        if download_failed {
            outbound.text = format!(
                "(User sent an image URL: {}, but the visual data could not be \
                 downloaded. Do not guess what is in the image.)",
                text
            );
        }

        match self.primary.chat(std::slice::from_ref(&outbound)).await {
            Ok(raw) => self.append_reply(raw, false).await,
            Err(primary_err) => {
                log::warn!("Primary chat call failed: {}", primary_err);
                if primary_err.is_failover_eligible() && self.fallback.is_some() {
                    self.run_fallback(primary_err).await
                } else {
                    self.append_error(&primary_err, false)
                }
            }
        }
    }

    async fn run_fallback(&mut self, primary_err: HeyMemeError) -> TurnOutcome {
        log::info!("Failing over to the backup chat provider");
        // The backup provider is not assumed to know the persona; the
        // instruction travels as the payload's first turn.
        let mut payload = vec![ChatMessage::system()
            .text(self.persona.system_instruction)
            .build()];
        payload.extend(fallback_history(
            &self.history,
            &self.error_ids,
            FALLBACK_HISTORY_LIMIT,
        ));
        let result = match self.fallback.as_ref() {
            Some(fallback) => fallback.chat(&payload).await,
            None => return self.append_error(&primary_err, false),
        };
        match result {
            Ok(raw) => self.append_reply(raw, true).await,
            Err(backup_err) => {
                log::error!(
                    "Backup provider failed too (primary: {}): {}",
                    primary_err,
                    backup_err
                );
                self.append_error(&backup_err, true)
            }
        }
    }

    /// Parses the reply for a meme directive, fetches the meme when possible
    /// and appends the model message.
    async fn append_reply(&mut self, raw: String, used_backup: bool) -> TurnOutcome {
        let parsed = parse_reply(&raw);

        let mut message = ChatMessage::model().text(parsed.text).build();
        if let (Some(keywords), Some(giphy)) = (&parsed.keywords, &self.giphy) {
            match giphy.random(keywords).await {
                Ok(url) => message.meme_url = Some(url),
                // Lookup failure leaves the message text-only.
                Err(e) => log::warn!("Meme lookup for '{}' failed: {}", keywords, e),
            }
        }

        self.history.push(message.clone());
        TurnOutcome {
            message,
            used_backup,
            is_error: false,
        }
    }

    fn append_error(&mut self, err: &HeyMemeError, from_backup: bool) -> TurnOutcome {
        let message = ChatMessage::model().text(error_notice(err, from_backup)).build();
        self.error_ids.push(message.id.clone());
        self.history.push(message.clone());
        TurnOutcome {
            message,
            used_backup: from_backup,
            is_error: true,
        }
    }

    async fn fetch_image_base64(&self, url: &str) -> Result<String, HeyMemeError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(BASE64.encode(bytes))
    }
}

/// Reconstructs the bounded history the fallback provider receives: error
/// notices dropped, then the most recent `limit` turns. The persona
/// instruction is prepended separately as the payload's first turn.
pub(crate) fn fallback_history(
    history: &[ChatMessage],
    error_ids: &[String],
    limit: usize,
) -> Vec<ChatMessage> {
    let kept: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| !error_ids.contains(&m.id))
        .collect();
    let start = kept.len().saturating_sub(limit);
    kept[start..].iter().map(|m| (*m).clone()).collect()
}

/// Renders a terminal failure as a short, categorized notification.
fn error_notice(err: &HeyMemeError, from_backup: bool) -> String {
    if from_backup {
        return format!("💀 Backup provider failed: {}", err);
    }
    match err {
        HeyMemeError::RateLimited(_) => {
            "😵‍💫 Brain overheated... the primary provider is out of quota. \
             Add a backup key in settings."
                .to_string()
        }
        HeyMemeError::InvalidRequest(_) => {
            "🤔 That image looks malformed, I can't make sense of it...".to_string()
        }
        _ => "Something broke... (API Error)".to_string(),
    }
}
