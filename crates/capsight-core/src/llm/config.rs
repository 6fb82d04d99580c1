use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigError;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gpt-oss";

/// Connection settings for the local chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Model tag passed to `/api/chat`
    pub model: String,
    /// Connection timeout in seconds
    pub connect_timeout_seconds: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout_seconds: 30,
            request_timeout_seconds: 1000,
        }
    }
}

impl LlmConfig {
    pub fn chat_url(&self) -> Result<Url, url::ParseError> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&base)?.join("api/chat")
    }

    pub fn is_local(&self) -> bool {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .is_some_and(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]" | "::1"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.base_url,
                url.scheme()
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
