use crate::config::{OpenAiConfig, DEFAULT_TTS_MODEL};
use crate::error::VoiceError;
use callflow_types::TtsVoice;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Maximum text input accepted by the speech endpoint, in characters.
const MAX_TTS_INPUT_CHARS: usize = 4096;

/// Timeout for a single synthesis request.
const TTS_TIMEOUT: Duration = Duration::from_secs(60);

/// Sample rate of the `pcm` response format (s16le, mono).
pub const TTS_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// Service for generating speech from text.
#[derive(Debug, Clone)]
pub struct TtsService {
    client: Client,
    config: OpenAiConfig,
    model: String,
}

impl TtsService {
    pub fn new(config: OpenAiConfig) -> Result<Self, VoiceError> {
        Self::with_model(config, DEFAULT_TTS_MODEL)
    }

    pub fn with_model(config: OpenAiConfig, model: impl Into<String>) -> Result<Self, VoiceError> {
        let client = Client::builder().timeout(TTS_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Synthesizes `text` with the given voice.
    ///
    /// Returns raw PCM audio (s16le, mono, [`TTS_SAMPLE_RATE`] Hz).
    pub async fn synthesize(&self, text: &str, voice: TtsVoice) -> Result<Vec<u8>, VoiceError> {
        let chars = text.chars().count();
        if chars > MAX_TTS_INPUT_CHARS {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} chars (limit: {} chars)",
                chars, MAX_TTS_INPUT_CHARS
            )));
        }
        if self.config.api_key.is_empty() {
            return Err(VoiceError::Config("OpenAI API key is not set".to_string()));
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice.as_str(),
            response_format: "pcm",
        };

        debug!(voice = %voice, chars, "requesting speech synthesis");

        let response = self
            .client
            .post(self.config.endpoint("audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!("HTTP {}: {}", status, body)));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("Failed to read audio: {}", e)))?;

        Ok(audio.to_vec())
    }
}
