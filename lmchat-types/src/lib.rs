#![deny(missing_docs)]
//! Shared types for lmchat.
//!
//! The decoder ([`lmchat-stream`]) turns a chat-completion byte stream into
//! [`StreamEvent`]s; the client and the command-line front end consume them.
//!
//! [`lmchat-stream`]: https://docs.rs/lmchat-stream

pub mod error;
pub mod stream;
pub mod types;

pub use error::*;
pub use stream::*;
pub use types::*;
