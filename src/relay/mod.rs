//! The relay: a stateless two-piece bridge between chat sessions and the
//! primary language-model provider.
//!
//! The server side (feature `api`) exposes `POST /api/chat`, builds the
//! provider-specific turn list and forwards it upstream with a server-held
//! credential; it performs no retry and returns the upstream JSON
//! unmodified. The client side implements [`crate::chat::ChatProvider`]
//! over that endpoint for the session's primary path.

pub mod client;
pub mod types;

#[cfg(feature = "api")]
mod server;

pub use client::RelayClient;
#[cfg(feature = "api")]
pub use server::RelayServer;
