#![deny(missing_docs)]
//! Streaming client for OpenAI-compatible chat servers.
//!
//! Builds the `/v1/chat/completions` request (user query, optional system
//! instructions, `stream: true`), sends it with `reqwest`, and hands the
//! response body to [`lmchat_stream::decode`].

pub mod client;
pub(crate) mod error;
pub mod settings;

pub use client::LmChat;
pub use error::ClientError;
pub use settings::{ChatSettings, SettingsError};

pub use lmchat_types::{StreamEvent, StreamHandle, StreamOutcome};
