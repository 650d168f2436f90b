//! HeyMeme turns moods into memes.
//!
//! # Overview
//! This crate provides the full engine behind a mood-to-GIF app:
//!
//! - Mood search: a free-text mood is translated into GIF search keywords by
//!   an LLM and looked up across Giphy and Tenor concurrently
//! - Persona chat: meme-literate characters that answer in their own voice
//!   and attach a reaction GIF by emitting an inline meme directive
//! - Provider failover: a primary Gemini call with an OpenAI backup when the
//!   primary runs out of quota or is unreachable
//! - A relay server that lets clients talk to Gemini without holding the key
//!
//! # Architecture
//! The crate is organized into modules that each own one of those concerns:

// Re-export for convenience
pub use async_trait::async_trait;

/// Clients for the supported LLM providers (Google Gemini, OpenAI)
pub mod backends;

/// Chat message types and the provider trait
pub mod chat;

/// Parsing of meme directives and image URLs out of model replies
pub mod directive;

/// Error types and handling
pub mod error;

/// Giphy and Tenor clients and the interleaved combined search
pub mod gif;

/// API key resolution and the on-disk key store
pub mod keys;

/// Mood-to-keywords translation with provider fallback
pub mod keywords;

/// The built-in chat personas
pub mod persona;

/// The relay client, wire types and (behind the "api" feature) the server
pub mod relay;

/// Persona chat sessions with history and failover
pub mod session;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
