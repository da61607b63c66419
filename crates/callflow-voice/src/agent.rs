use crate::error::VoiceError;
use crate::stt::SttService;
use callflow_types::NoiseCancellation;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Default capacity for the per-agent transcription broadcast channel.
const DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY: usize = 256;

/// Event emitted when the agent hears and transcribes caller speech.
#[derive(Debug, Clone)]
pub struct TranscriptionEvent {
    pub room_name: String,
    pub speaker_identity: String,
    pub text: String,
}

/// Inbound audio options, fixed when the agent joins the room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoomInputOptions {
    pub noise_cancellation: Option<NoiseCancellation>,
}

/// The agent's participant in a LiveKit room.
///
/// The media path is simulated: no WebRTC session is opened. Published audio
/// is counted and dropped, and caller speech enters through [`hear`] (audio,
/// transcribed with STT) or [`push_transcript`] (text). Wrapping a
/// `livekit::Room` with a `LocalAudioTrack` would replace both ends.
///
/// [`hear`]: AgentVoiceClient::hear
/// [`push_transcript`]: AgentVoiceClient::push_transcript
#[derive(Debug)]
pub struct AgentVoiceClient {
    pub room_url: String,
    pub token: String,
    pub room_name: String,
    pub input_options: RoomInputOptions,
    pub connected: bool,
    pub stt_service: Arc<SttService>,
    pub transcription_tx: broadcast::Sender<TranscriptionEvent>,
    published_bytes: AtomicU64,
}

impl AgentVoiceClient {
    /// Joins `room_name` with the given token. Only the URL is checked.
    pub async fn connect(
        url: &str,
        token: &str,
        room_name: &str,
        input_options: RoomInputOptions,
        stt_service: Arc<SttService>,
    ) -> Result<Self, VoiceError> {
        if url.is_empty() {
            return Err(VoiceError::Config("LiveKit URL is not set".to_string()));
        }

        info!(
            room = room_name,
            url,
            token_len = token.len(),
            noise_cancellation = ?input_options.noise_cancellation,
            "agent joining room (simulated media)"
        );

        let (tx, _) = broadcast::channel(DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY);

        Ok(Self {
            room_url: url.to_string(),
            token: token.to_string(),
            room_name: room_name.to_string(),
            input_options,
            connected: true,
            stt_service,
            transcription_tx: tx,
            published_bytes: AtomicU64::new(0),
        })
    }

    /// Publishes PCM audio data to the room.
    pub async fn publish_audio(&self, pcm_data: &[u8]) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "Agent is not connected to a room".to_string(),
            ));
        }

        info!(
            bytes = pcm_data.len(),
            room = %self.room_name,
            "agent publishing audio"
        );
        self.published_bytes
            .fetch_add(pcm_data.len() as u64, Ordering::Relaxed);

        Ok(())
    }

    /// Total bytes published since connecting.
    pub fn published_bytes(&self) -> u64 {
        self.published_bytes.load(Ordering::Relaxed)
    }

    pub async fn disconnect(&mut self) {
        if self.connected {
            info!(room = %self.room_name, "agent disconnecting from room");
            self.connected = false;
        }
    }

    /// Transcribes audio heard from `speaker` and broadcasts the result.
    pub async fn hear(&self, audio: &[u8], speaker: &str) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "Agent is not connected to a room".to_string(),
            ));
        }

        let text = self.stt_service.transcribe(audio).await?;
        if text.is_empty() {
            return Ok(());
        }

        self.push_transcript(speaker, text);
        Ok(())
    }

    /// Broadcasts an already-transcribed caller utterance.
    pub fn push_transcript(&self, speaker: &str, text: impl Into<String>) {
        let event = TranscriptionEvent {
            room_name: self.room_name.clone(),
            speaker_identity: speaker.to_string(),
            text: text.into(),
        };

        // No subscribers just means nobody is listening yet.
        let _ = self.transcription_tx.send(event);
    }

    /// Subscribes to transcription events from this client.
    pub fn subscribe_transcriptions(&self) -> broadcast::Receiver<TranscriptionEvent> {
        self.transcription_tx.subscribe()
    }
}
