//! Byte sources feeding the decoder.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use lmchat_types::StreamError;

/// Bytes delivered by a [`ByteSource`] in one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteChunk {
    /// The data; may be empty.
    pub bytes: Bytes,
    /// Set once the source has nothing more to deliver.
    pub is_final: bool,
}

impl ByteChunk {
    /// A chunk of data with more to follow.
    pub fn data(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            is_final: false,
        }
    }

    /// The empty end-of-stream marker.
    pub fn end() -> Self {
        Self {
            bytes: Bytes::new(),
            is_final: true,
        }
    }
}

/// An asynchronous supplier of response bytes.
///
/// `next_chunk` is the session's only suspension point. The decoder races it
/// against cancellation and simply drops the pending future when cancelled,
/// so implementations must tolerate being abandoned mid-read.
pub trait ByteSource: Send {
    /// Wait for the next chunk of bytes.
    fn next_chunk(&mut self) -> impl Future<Output = Result<ByteChunk, StreamError>> + Send;

    /// Release the underlying connection. Called once on every exit path.
    fn close(&mut self);
}

/// [`ByteSource`] over any fallible byte stream, such as an HTTP response body.
pub struct StreamSource<S> {
    inner: Option<Pin<Box<S>>>,
}

impl<S> StreamSource<S> {
    /// Wrap a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: Some(Box::pin(stream)),
        }
    }

    /// Whether the stream has ended or been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl<S, B, E> ByteSource for StreamSource<S>
where
    S: Stream<Item = Result<B, E>> + Send,
    B: Into<Bytes>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    async fn next_chunk(&mut self) -> Result<ByteChunk, StreamError> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(ByteChunk::end());
        };
        match inner.next().await {
            Some(Ok(bytes)) => Ok(ByteChunk::data(bytes)),
            Some(Err(err)) => Err(StreamError::read(err)),
            None => {
                self.inner = None;
                Ok(ByteChunk::end())
            }
        }
    }

    fn close(&mut self) {
        self.inner = None;
    }
}

impl<S> std::fmt::Debug for StreamSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("closed", &self.is_closed())
            .finish()
    }
}
