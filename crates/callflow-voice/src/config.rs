use serde::{Deserialize, Serialize};
use std::fmt;

/// Default OpenAI-compatible API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Speech-to-text model used for caller audio.
pub const DEFAULT_STT_MODEL: &str = "gpt-4o-mini-transcribe";

/// Dialogue model used by both agents.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Text-to-speech model used by both agents.
pub const DEFAULT_TTS_MODEL: &str = "gpt-4o-mini-tts";

fn default_token_ttl_seconds() -> u64 {
    3600
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for the agent's join token. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

/// Credentials and endpoint for the OpenAI-compatible speech and dialogue APIs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_openai_base_url(),
        }
    }

    /// Joins `path` onto the configured base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let lk = LiveKitConfig::new("ws://localhost:7880", "devkey", "supersecret");
        let oa = OpenAiConfig::new("sk-live-123");
        let rendered = format!("{lk:?} {oa:?}");
        assert!(!rendered.contains("supersecret"));
        assert!(!rendered.contains("sk-live-123"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut oa = OpenAiConfig::new("k");
        oa.base_url = "http://localhost:8080/v1/".to_string();
        assert_eq!(
            oa.endpoint("/audio/speech"),
            "http://localhost:8080/v1/audio/speech"
        );
    }
}
