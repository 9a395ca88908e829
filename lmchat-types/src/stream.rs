//! Events yielded by a decoding session and the handle that carries them.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::types::{ContentDelta, StreamOutcome};

/// One item of a decoding session.
///
/// A session yields zero or more [`StreamEvent::Delta`] items followed by
/// exactly one [`StreamEvent::Finished`], after which the stream ends.
#[derive(Debug)]
pub enum StreamEvent {
    /// A fragment of generated text.
    Delta(ContentDelta),
    /// The terminal outcome.
    Finished(StreamOutcome),
}

impl StreamEvent {
    /// Returns `true` for [`StreamEvent::Finished`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Text of a [`StreamEvent::Delta`].
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::Delta(delta) => Some(delta.as_str()),
            Self::Finished(_) => None,
        }
    }
}

/// Owned, non-restartable stream of [`StreamEvent`]s for one session.
pub struct StreamHandle {
    /// The event stream. Dropping it abandons the session and releases the source.
    pub receiver: Pin<Box<dyn Stream<Item = StreamEvent> + Send>>,
}

impl StreamHandle {
    /// Wrap any event stream.
    pub fn new(stream: impl Stream<Item = StreamEvent> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(stream),
        }
    }

    /// Drive the session to its end, concatenating every delta.
    ///
    /// A stream that ends without a `Finished` event is reported as
    /// [`StreamOutcome::Completed`].
    pub async fn collect(mut self) -> (String, StreamOutcome) {
        let mut text = String::new();
        while let Some(event) = self.receiver.next().await {
            match event {
                StreamEvent::Delta(delta) => text.push_str(delta.as_str()),
                StreamEvent::Finished(outcome) => return (text, outcome),
            }
        }
        (text, StreamOutcome::Completed)
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}
