//! Port implementations over the voice services, plus local console stand-ins.

use super::traits::{DialogueModel, ModelTurn, RoomControl, SpeechOutput, ThinkingIndicator};
use async_trait::async_trait;
use callflow_types::{ChatContext, TtsVoice};
use callflow_voice::{
    AgentVoiceClient, BackgroundAudioPlayer, ChatClient, ChatCompletion, RoomService,
    ToolDefinition, TtsService, VoiceError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info};

impl From<ChatCompletion> for ModelTurn {
    fn from(completion: ChatCompletion) -> Self {
        if completion.tool_calls.is_empty() {
            ModelTurn::Reply(completion.text.unwrap_or_default())
        } else {
            if let Some(text) = &completion.text {
                debug!(text = %text, "dropping text that accompanied tool calls");
            }
            ModelTurn::Tools(completion.tool_calls)
        }
    }
}

#[async_trait]
impl DialogueModel for ChatClient {
    async fn respond(
        &self,
        context: &ChatContext,
        tools: &[ToolDefinition],
        instructions: Option<&str>,
    ) -> Result<ModelTurn, VoiceError> {
        Ok(self.complete(context, tools, instructions).await?.into())
    }
}

#[async_trait]
impl RoomControl for RoomService {
    async fn delete_room(&self, room: &str) -> Result<(), VoiceError> {
        RoomService::delete_room(self, room).await
    }
}

#[async_trait]
impl ThinkingIndicator for BackgroundAudioPlayer {
    async fn thinking_started(&self) -> Result<(), VoiceError> {
        BackgroundAudioPlayer::thinking_started(self).await
    }

    fn thinking_stopped(&self) {
        BackgroundAudioPlayer::thinking_stopped(self)
    }
}

/// Speaks through TTS and publishes the audio into the room.
pub struct RoomSpeech {
    tts: TtsService,
    client: Arc<AgentVoiceClient>,
}

impl RoomSpeech {
    pub fn new(tts: TtsService, client: Arc<AgentVoiceClient>) -> Self {
        Self { tts, client }
    }
}

#[async_trait]
impl SpeechOutput for RoomSpeech {
    async fn say(
        &self,
        text: &str,
        voice: TtsVoice,
        allow_interruptions: bool,
    ) -> Result<(), VoiceError> {
        info!(voice = %voice, allow_interruptions, text, "agent speaking");
        let pcm = self.tts.synthesize(text, voice).await?;
        self.client.publish_audio(&pcm).await
    }
}

/// Writes agent utterances as text lines, for console sessions.
pub struct ConsoleSpeech<W> {
    out: Mutex<W>,
}

impl ConsoleSpeech<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleSpeech<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SpeechOutput for ConsoleSpeech<W> {
    async fn say(
        &self,
        text: &str,
        voice: TtsVoice,
        _allow_interruptions: bool,
    ) -> Result<(), VoiceError> {
        let line = format!("[{}] {}\n", voice, text);
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| VoiceError::Tts(format!("Failed to write to console: {}", e)))?;
        out.flush()
            .await
            .map_err(|e| VoiceError::Tts(format!("Failed to flush console: {}", e)))
    }
}

/// A room that only exists in this process. Deleting it flags it closed.
#[derive(Debug, Default)]
pub struct LocalRoom {
    deleted: AtomicBool,
}

impl LocalRoom {
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }
}

#[async_trait]
impl RoomControl for LocalRoom {
    async fn delete_room(&self, room: &str) -> Result<(), VoiceError> {
        info!(room, "closing local room");
        self.deleted.store(true, Ordering::Release);
        Ok(())
    }
}

/// No thinking feedback.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentThinking;

#[async_trait]
impl ThinkingIndicator for SilentThinking {
    async fn thinking_started(&self) -> Result<(), VoiceError> {
        Ok(())
    }

    fn thinking_stopped(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use callflow_types::ToolCall;
    use serde_json::json;

    #[test]
    fn completion_with_tools_becomes_tool_turn() {
        let completion = ChatCompletion {
            text: Some("Sure.".to_string()),
            tool_calls: vec![ToolCall::new("c1", "get_claims", json!({}))],
        };
        match ModelTurn::from(completion) {
            ModelTurn::Tools(calls) => assert_eq!(calls[0].name, "get_claims"),
            other => panic!("expected tools, got {:?}", other),
        }
    }

    #[test]
    fn completion_without_text_is_empty_reply() {
        let turn = ModelTurn::from(ChatCompletion::default());
        assert_eq!(turn, ModelTurn::Reply(String::new()));
    }

    #[tokio::test]
    async fn console_speech_prefixes_voice() {
        let speech = ConsoleSpeech::new(Vec::new());
        speech.say("Hello", TtsVoice::Ash, true).await.unwrap();
        speech.say("Bye", TtsVoice::Sage, false).await.unwrap();
        let written = String::from_utf8(speech.into_inner()).unwrap();
        assert_eq!(written, "[ash] Hello\n[sage] Bye\n");
    }

    #[tokio::test]
    async fn local_room_flags_deletion() {
        let room = LocalRoom::default();
        assert!(!room.is_deleted());
        room.delete_room("console").await.unwrap();
        assert!(room.is_deleted());
    }
}
