//! Error types for all lmchat crates.

/// Unrecoverable failures that end a decoding session.
///
/// Malformed JSON frames and records of an unexpected shape are absorbed by
/// the decoder and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The byte stream is not valid UTF-8 and cannot become valid.
    #[error("UTF-8 decode error: {0}")]
    Decode(String),
    /// The underlying byte source failed.
    #[error("stream read error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StreamError {
    /// Wrap a byte-source failure.
    pub fn read(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Source(err.into())
    }

    /// Whether re-issuing the request might succeed.
    ///
    /// A broken connection is transient; an undecodable payload is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}
