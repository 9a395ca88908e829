#![deny(missing_docs)]
//! Incremental decoding of streamed chat-completion responses.
//!
//! A chat-completion endpoint streams records like
//! `{"choices":[{"delta":{"content":"Hel"}}]}`, usually wrapped in SSE
//! `data:` lines, split across network chunks at arbitrary byte positions.
//! This crate turns that byte stream into [`ContentDelta`]s:
//!
//! - [`FrameBuffer`] finds complete JSON objects in the buffered text, one per
//!   call, holding back partial objects and split UTF-8 sequences.
//! - [`decode`] drives a [`ByteSource`] through the extractor, applies the
//!   response limit and cancellation after every frame, and yields
//!   [`StreamEvent`]s ending in one [`StreamOutcome`].
//!
//! ```no_run
//! use futures::stream;
//! use lmchat_stream::{decode, DecoderConfig, StreamSource};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let body = stream::iter(vec![Ok::<_, std::io::Error>(
//!     &b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n"[..],
//! )]);
//! let handle = decode(StreamSource::new(body), CancellationToken::new(), DecoderConfig::default());
//! let (text, outcome) = handle.collect().await;
//! assert_eq!(text, "Hi");
//! assert!(outcome.is_completed());
//! # }
//! ```

pub mod config;
pub mod decoder;
pub mod frame;
pub mod source;
mod utf8;

pub use config::DecoderConfig;
pub use decoder::{decode, decode_stream};
pub use frame::{Extraction, Frame, FrameBuffer};
pub use source::{ByteChunk, ByteSource, StreamSource};

pub use lmchat_types::{AbortReason, ContentDelta, StreamError, StreamEvent, StreamHandle, StreamOutcome};
