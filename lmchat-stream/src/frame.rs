//! Frame extraction: finding complete JSON objects in a chunked text stream.
//!
//! The extractor is agnostic to the framing the server wraps around its
//! records. SSE (`data: {...}\n\n`), NDJSON and bare concatenated objects all
//! work, because only the braces matter:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}\n\ndata: {"cho
//!       ^ first '{'                             ^ last '}'
//! ```
//!
//! The candidate frame runs from the first `{` to the last `}` in the buffer,
//! and the leading JSON object of that span is the frame. Only one frame is
//! taken per call; call again with an empty slice to drain the rest.
//!
//! State is threaded explicitly: [`FrameBuffer::extract`] consumes the old
//! buffer and returns the new one alongside the frame, if any.

use lmchat_types::{CompletionChunk, StreamError};
use serde::Deserialize;

use crate::utf8;

/// Unparsed state carried between extraction calls.
///
/// `text` always starts at the first unmatched `{`, or is empty. `pending`
/// holds the bytes of a code point split across chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    text: String,
    pending: Vec<u8>,
}

/// One complete top-level JSON object taken from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    raw: String,
    value: serde_json::Value,
}

/// Result of one [`FrameBuffer::extract`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Buffer to pass to the next call.
    pub buffer: FrameBuffer,
    /// The frame completed by this call.
    pub frame: Option<Frame>,
}

impl FrameBuffer {
    /// An empty buffer for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffered text not yet consumed by a frame.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of bytes held back from an unfinished UTF-8 sequence.
    pub fn pending_bytes(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing at all is buffered.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.pending.is_empty()
    }

    /// Append `new_bytes` and take at most one complete frame.
    ///
    /// JSON that fails to parse is never an error: an object that is still
    /// arriving stays buffered, and an object that can never parse is
    /// dropped. Only undecodable UTF-8 fails.
    pub fn extract(self, new_bytes: &[u8]) -> Result<Extraction, StreamError> {
        let (decoded, pending) = utf8::decode(self.pending, new_bytes)?;
        let mut text = self.text;
        text.push_str(&decoded);
        let frame = take_frame(&mut text);
        Ok(Extraction {
            buffer: Self { text, pending },
            frame,
        })
    }

    /// Close the buffer at end of stream, returning any unconsumed text.
    ///
    /// Fails if the stream ended in the middle of a UTF-8 sequence.
    pub fn finish(self) -> Result<String, StreamError> {
        utf8::finish(&self.pending)?;
        Ok(self.text)
    }
}

impl Frame {
    /// The frame's source text, from `{` to its closing `}`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed JSON object.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Interpret the frame as a streamed completion record.
    pub fn completion_chunk(&self) -> Result<CompletionChunk, serde_json::Error> {
        CompletionChunk::deserialize(&self.value)
    }
}

/// Take the leading frame out of `text`, trimming what can never be part of one.
fn take_frame(text: &mut String) -> Option<Frame> {
    trim_to_open_brace(text);

    // text[0] is '{', so any '}' found lies after it.
    let end = text.rfind('}')?;
    let parsed = {
        let mut values =
            serde_json::Deserializer::from_str(&text[..=end]).into_iter::<serde_json::Value>();
        values.next()?.map(|value| (value, values.byte_offset()))
    };
    match parsed {
        Ok((value, consumed)) => {
            let raw: String = text.drain(..consumed).collect();
            trim_to_open_brace(text);
            Some(Frame { raw, value })
        }
        Err(err) if err.is_eof() => {
            tracing::trace!(buffered = text.len(), "frame incomplete, waiting for more data");
            None
        }
        Err(err) => {
            tracing::debug!(error = %err, "discarding malformed frame");
            text.drain(..1);
            trim_to_open_brace(text);
            None
        }
    }
}

/// Drop everything before the first `{`, or everything if there is none.
fn trim_to_open_brace(text: &mut String) {
    match text.find('{') {
        Some(start) => {
            text.drain(..start);
        }
        None => text.clear(),
    }
}
