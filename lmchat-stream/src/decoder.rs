//! The stream decoder: byte source in, content deltas out.

use futures::Stream;
use lmchat_types::{AbortReason, ContentDelta, StreamEvent, StreamHandle, StreamOutcome};
use tokio_util::sync::CancellationToken;

use crate::config::DecoderConfig;
use crate::frame::{Extraction, Frame, FrameBuffer};
use crate::source::ByteSource;

/// Decode a chat-completion byte stream into a [`StreamHandle`].
///
/// The returned stream yields one [`StreamEvent::Delta`] per non-empty choice
/// content, in arrival order, then exactly one [`StreamEvent::Finished`]:
///
/// - [`StreamOutcome::Completed`] when the source reaches end-of-stream,
/// - [`StreamOutcome::Aborted`] when `cancel` fires or more than
///   [`DecoderConfig::response_limit`] frames arrive,
/// - [`StreamOutcome::Failed`] on a source error or undecodable UTF-8.
///
/// Nothing is read until the handle is polled. The source is closed on every
/// exit path; dropping the handle early drops the source with it.
pub fn decode<S>(source: S, cancel: CancellationToken, config: DecoderConfig) -> StreamHandle
where
    S: ByteSource + 'static,
{
    StreamHandle::new(decode_stream(source, cancel, config))
}

/// Unboxed form of [`decode`].
pub fn decode_stream<S>(
    mut source: S,
    cancel: CancellationToken,
    config: DecoderConfig,
) -> impl Stream<Item = StreamEvent> + Send + 'static
where
    S: ByteSource + 'static,
{
    async_stream::stream! {
        let mut buffer = FrameBuffer::new();
        let mut responses: usize = 0;

        let outcome = 'session: loop {
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                chunk = source.next_chunk() => Some(chunk),
            };
            let chunk = match read {
                None => break 'session StreamOutcome::Aborted(AbortReason::Cancelled),
                Some(Err(err)) => break 'session StreamOutcome::Failed(err),
                Some(Ok(chunk)) => chunk,
            };
            tracing::trace!(bytes = chunk.bytes.len(), is_final = chunk.is_final, "received chunk");

            let mut input: &[u8] = &chunk.bytes;
            loop {
                let Extraction { buffer: next, frame } = match std::mem::take(&mut buffer).extract(input) {
                    Ok(extraction) => extraction,
                    Err(err) => break 'session StreamOutcome::Failed(err),
                };
                buffer = next;
                input = &[];

                let Some(frame) = frame else { break };
                responses += 1;
                if responses > config.response_limit {
                    break 'session StreamOutcome::Aborted(AbortReason::LimitExceeded);
                }
                for delta in frame_deltas(&frame) {
                    yield StreamEvent::Delta(delta);
                }
                if cancel.is_cancelled() {
                    break 'session StreamOutcome::Aborted(AbortReason::Cancelled);
                }
            }

            if chunk.is_final {
                break 'session match std::mem::take(&mut buffer).finish() {
                    Ok(leftover) => {
                        if !leftover.is_empty() {
                            tracing::debug!(bytes = leftover.len(), "discarding incomplete frame at end of stream");
                        }
                        StreamOutcome::Completed
                    }
                    Err(err) => StreamOutcome::Failed(err),
                };
            }
        };

        source.close();
        match &outcome {
            StreamOutcome::Failed(err) => tracing::warn!(error = %err, frames = responses, "stream failed"),
            other => tracing::debug!(outcome = ?other, frames = responses, "stream finished"),
        }
        yield StreamEvent::Finished(outcome);
    }
}

/// Content deltas of one frame. Frames of any other shape carry none.
fn frame_deltas(frame: &Frame) -> Vec<ContentDelta> {
    match frame.completion_chunk() {
        Ok(chunk) => chunk.deltas().collect(),
        Err(err) => {
            tracing::trace!(error = %err, frame = frame.as_str(), "frame is not a completion chunk");
            Vec::new()
        }
    }
}
