//! Ports to the external collaborators the session drives.
//!
//! Production adapters live in `adapters`; tests use recording mocks.

use async_trait::async_trait;
use callflow_types::{ChatContext, ToolCall, TtsVoice};
use callflow_voice::{ToolDefinition, VoiceError};

/// What the dialogue model decided for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// Speak this text.
    Reply(String),
    /// Invoke these tools, in order.
    Tools(Vec<ToolCall>),
}

/// Plays agent utterances to the caller.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn say(
        &self,
        text: &str,
        voice: TtsVoice,
        allow_interruptions: bool,
    ) -> Result<(), VoiceError>;
}

/// Decides the agent's next turn.
#[async_trait]
pub trait DialogueModel: Send + Sync {
    async fn respond(
        &self,
        context: &ChatContext,
        tools: &[ToolDefinition],
        instructions: Option<&str>,
    ) -> Result<ModelTurn, VoiceError>;
}

/// Room management on the transport.
#[async_trait]
pub trait RoomControl: Send + Sync {
    async fn delete_room(&self, room: &str) -> Result<(), VoiceError>;
}

/// Feedback played while the agent waits on the model.
#[async_trait]
pub trait ThinkingIndicator: Send + Sync {
    async fn thinking_started(&self) -> Result<(), VoiceError>;
    fn thinking_stopped(&self);
}
