//! Value types shared by the decoder, the client and the front end.

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// A single fragment of generated text, in arrival order.
///
/// The decoder treats the text as opaque; rendering is up to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDelta(pub String);

impl ContentDelta {
    /// Borrow the delta text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the delta, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ContentDelta {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for ContentDelta {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for ContentDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a session stopped before the source reached end-of-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The cancellation token was triggered.
    Cancelled,
    /// More frames arrived than the configured response limit allows.
    LimitExceeded,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::LimitExceeded => f.write_str("response limit exceeded"),
        }
    }
}

/// Terminal result of one decoding session. Exactly one is produced per session.
#[derive(Debug)]
pub enum StreamOutcome {
    /// The source reported end-of-stream.
    Completed,
    /// The session was stopped by cancellation or the response limit.
    Aborted(AbortReason),
    /// An unrecoverable decode or source error ended the session.
    Failed(StreamError),
}

impl StreamOutcome {
    /// Whether the stream ran to its natural end.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the stream was stopped by cancellation or the response limit.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Whether the stream ended with an error.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One streamed chat-completion record: `{"choices":[{"delta":{"content":"..."}}]}`.
///
/// Every field is optional. Records without choices or without delta
/// content are valid and simply carry no text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    /// Choices in server order.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

/// A single choice entry within a [`CompletionChunk`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Incremental content for this choice.
    #[serde(default)]
    pub delta: Option<ChoiceDelta>,
}

/// The `delta` object of a streamed choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDelta {
    /// Generated text fragment.
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// Content deltas carried by this record, in choice order.
    ///
    /// Choices whose content is missing or empty are skipped.
    pub fn deltas(&self) -> impl Iterator<Item = ContentDelta> + '_ {
        self.choices
            .iter()
            .flatten()
            .filter_map(|choice| choice.delta.as_ref()?.content.as_deref())
            .filter(|content| !content.is_empty())
            .map(ContentDelta::from)
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that steer the assistant.
    System,
    /// The person asking.
    User,
    /// The model.
    Assistant,
}

/// A message in the outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Body of a streaming `/v1/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier. Local servers usually serve whatever is loaded, so
    /// this is omitted unless set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate; `-1` means no limit.
    pub max_tokens: i64,
    /// Always `true`: the decoder only handles streamed responses.
    pub stream: bool,
}

impl ChatRequest {
    /// Build a streaming request for a single query.
    ///
    /// The user message comes first. Custom instructions are appended as a
    /// system message only when they contain non-whitespace text.
    pub fn new(
        query: impl Into<String>,
        custom_instructions: Option<&str>,
        temperature: f64,
        max_tokens: i64,
    ) -> Self {
        let mut messages = vec![ChatMessage::user(query)];
        if let Some(instructions) = custom_instructions.filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::system(instructions));
        }
        Self {
            model: None,
            messages,
            temperature,
            max_tokens,
            stream: true,
        }
    }
}
