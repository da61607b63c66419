use crate::config::{OpenAiConfig, DEFAULT_STT_MODEL};
use crate::error::VoiceError;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;

/// Maximum audio input size for STT (10 MiB). Prevents OOM from oversized payloads.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Timeout for a single transcription request.
const STT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sample rate assumed for inbound caller audio (s16le, mono).
pub const STT_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone)]
pub struct SttService {
    client: Client,
    config: OpenAiConfig,
    model: String,
}

impl SttService {
    pub fn new(config: OpenAiConfig) -> Result<Self, VoiceError> {
        Self::with_model(config, DEFAULT_STT_MODEL)
    }

    pub fn with_model(config: OpenAiConfig, model: impl Into<String>) -> Result<Self, VoiceError> {
        let client = Client::builder().timeout(STT_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Transcribes raw PCM (s16le, mono, [`STT_SAMPLE_RATE`] Hz) to text.
    pub async fn transcribe(&self, pcm: &[u8]) -> Result<String, VoiceError> {
        if pcm.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                pcm.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        let wav = pcm_to_wav(pcm, STT_SAMPLE_RATE)?;
        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Stt(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.config.endpoint("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("HTTP {}: {}", status, body)));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.text.trim().to_string())
    }
}

/// Wraps raw s16le mono PCM in a WAV container.
///
/// A trailing odd byte is dropped.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, VoiceError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| VoiceError::Stt(format!("Failed to start WAV: {}", e)))?;
        for chunk in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
                .map_err(|e| VoiceError::Stt(format!("Failed to write sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| VoiceError::Stt(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_to_wav_round_trips_samples() {
        let samples: [i16; 4] = [0, 1000, -1000, i16::MAX];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let wav = pcm_to_wav(&pcm, STT_SAMPLE_RATE).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, STT_SAMPLE_RATE);
        let decoded: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn pcm_to_wav_drops_trailing_odd_byte() {
        let wav = pcm_to_wav(&[1, 0, 7], STT_SAMPLE_RATE).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.len(), 1);
    }
}
