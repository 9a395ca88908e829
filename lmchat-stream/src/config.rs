//! Configuration for the stream decoder.

use serde::{Deserialize, Serialize};

/// Limits applied to one decoding session.
///
/// Cancellation is passed separately as a `CancellationToken`, since it is
/// triggered from outside while the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Maximum number of frames whose deltas are emitted. The session aborts
    /// when a frame beyond this count arrives. Defaults to unbounded.
    #[serde(default = "unbounded")]
    pub response_limit: usize,
}

fn unbounded() -> usize {
    usize::MAX
}

impl DecoderConfig {
    /// Cap the number of frames processed.
    #[must_use]
    pub fn with_response_limit(mut self, limit: usize) -> Self {
        self.response_limit = limit;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            response_limit: unbounded(),
        }
    }
}
