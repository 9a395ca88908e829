//! Chat client struct and builder.

use lmchat_stream::{DecoderConfig, StreamSource, decode};
use lmchat_types::{ChatRequest, StreamHandle};
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, map_http_status, map_reqwest_error};
use crate::settings::{ChatSettings, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// # Example
///
/// ```no_run
/// use lmchat_client::LmChat;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), lmchat_client::ClientError> {
/// let client = LmChat::new("http://localhost:1234").custom_instructions("Be brief.");
/// let (text, outcome) = client.stream("Why is the sky blue?", CancellationToken::new()).await?.collect().await;
/// println!("{text} ({outcome:?})");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LmChat {
    pub(crate) server_address: String,
    pub(crate) custom_instructions: Option<String>,
    pub(crate) temperature: f64,
    pub(crate) max_tokens: i64,
    pub(crate) model: Option<String>,
    pub(crate) decoder: DecoderConfig,
    pub(crate) client: reqwest::Client,
}

impl LmChat {
    /// Create a client for the server at `server_address`.
    ///
    /// Defaults: temperature 0.7, no token cap, unbounded response count.
    #[must_use]
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            custom_instructions: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            model: None,
            decoder: DecoderConfig::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &ChatSettings) -> Self {
        let mut client = Self::new(settings.server_address.clone())
            .custom_instructions(settings.custom_instructions.clone())
            .temperature(settings.temperature)
            .max_tokens(settings.max_tokens)
            .decoder_config(settings.decoder_config());
        client.model = settings.model.clone();
        client
    }

    /// Instructions sent as a system message with every query.
    #[must_use]
    pub fn custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }

    /// Override the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the token cap. `-1` means no cap.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Name the model to use.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the decoder limits.
    #[must_use]
    pub fn decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder = config;
        self
    }

    /// The chat completions endpoint URL.
    pub fn chat_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.server_address.trim().trim_end_matches('/')
        )
    }

    /// The request body sent for `query`.
    pub fn build_request(&self, query: &str) -> ChatRequest {
        let mut request = ChatRequest::new(
            query,
            self.custom_instructions.as_deref(),
            self.temperature,
            self.max_tokens,
        );
        request.model = self.model.clone();
        request
    }

    /// Send `query` and stream the response.
    ///
    /// `cancel` covers the whole exchange: before the server answers it
    /// resolves to [`ClientError::Cancelled`], afterwards it ends the stream
    /// with an aborted outcome.
    pub async fn stream(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<StreamHandle, ClientError> {
        if self.server_address.trim().is_empty() {
            return Err(ClientError::EmptyServerAddress);
        }
        if query.trim().is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        let url = self.chat_url();
        let body = self.build_request(query);
        tracing::debug!(url = %url, messages = body.messages.len(), "sending streaming chat request");

        let send = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send();
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ClientError::Cancelled),
            response = send => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &text));
        }

        let source = StreamSource::new(response.bytes_stream());
        Ok(decode(source, cancel, self.decoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lmchat_types::{ChatMessage, Role};

    #[test]
    fn defaults_are_set() {
        let client = LmChat::new("http://localhost:1234");
        assert_eq!(client.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(client.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(client.custom_instructions.is_none());
        assert_eq!(client.decoder, DecoderConfig::default());
    }

    #[test]
    fn chat_url_includes_path() {
        let client = LmChat::new("http://localhost:1234");
        assert_eq!(client.chat_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn chat_url_trims_trailing_slash() {
        let client = LmChat::new("http://localhost:1234/");
        assert_eq!(client.chat_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn request_includes_instructions_as_system_message() {
        let client = LmChat::new("http://x").custom_instructions("be brief");
        let request = client.build_request("hello");
        assert_eq!(request.messages[0], ChatMessage::user("hello"));
        assert_eq!(request.messages[1].role, Role::System);
        assert!(request.stream);
    }

    #[test]
    fn from_settings_copies_everything() {
        let settings = ChatSettings {
            server_address: "http://remote:8080".into(),
            custom_instructions: "terse".into(),
            temperature: 0.2,
            max_tokens: 256,
            model: Some("qwen2.5-7b".into()),
            response_limit: 10,
        };
        let client = LmChat::from_settings(&settings);
        assert_eq!(client.server_address, "http://remote:8080");
        assert_eq!(client.custom_instructions.as_deref(), Some("terse"));
        assert_eq!(client.temperature, 0.2);
        assert_eq!(client.max_tokens, 256);
        assert_eq!(client.decoder.response_limit, 10);
        assert_eq!(client.build_request("q").model.as_deref(), Some("qwen2.5-7b"));
    }

    #[tokio::test]
    async fn empty_server_address_is_rejected() {
        let err = LmChat::new("  ")
            .stream("hi", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyServerAddress));
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let err = LmChat::new("http://localhost:1234")
            .stream("", CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyQuery));
    }
}
