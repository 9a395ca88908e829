//! User settings for the chat client.

use std::path::Path;

use lmchat_stream::DecoderConfig;
use serde::{Deserialize, Serialize};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default token cap; `-1` lets the server generate until it stops.
pub const DEFAULT_MAX_TOKENS: i64 = -1;

/// Settings that shape requests and decoding.
///
/// Every field is optional in the JSON form:
///
/// ```json
/// {
///   "server_address": "http://localhost:1234",
///   "custom_instructions": "Answer in one paragraph.",
///   "response_limit": 2000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Base URL of the OpenAI-compatible server, without the `/v1/...` path.
    pub server_address: String,
    /// Sent as a system message when not blank.
    pub custom_instructions: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: i64,
    /// Model identifier, for servers that need one.
    pub model: Option<String>,
    /// Maximum number of streamed records before the response is cut off.
    pub response_limit: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            custom_instructions: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            model: None,
            response_limit: DecoderConfig::default().response_limit,
        }
    }
}

/// Errors loading [`ChatSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON for [`ChatSettings`].
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ChatSettings {
    /// Parse settings from JSON text.
    pub fn from_json(src: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Read settings from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_json(&src)
    }

    /// Decoder limits derived from these settings.
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::default().with_response_limit(self.response_limit)
    }
}
