//! Mock ports for exercising sessions without I/O.
//!
//! All mocks append to one shared `CallLog` so tests can assert on the order
//! in which collaborators were called.

use super::session::SessionPorts;
use super::traits::{DialogueModel, ModelTurn, RoomControl, SpeechOutput, ThinkingIndicator};
use async_trait::async_trait;
use callflow_types::{ChatContext, TtsVoice};
use callflow_voice::{ToolDefinition, VoiceError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Say {
        text: String,
        voice: TtsVoice,
        allow_interruptions: bool,
    },
    Respond {
        instructions: Option<String>,
        tools: Vec<String>,
        system: Option<String>,
    },
    DeleteRoom(String),
    ThinkingStarted,
    ThinkingStopped,
}

#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn said(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Say { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn reply_instructions(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Respond { instructions, .. } => Some(instructions),
                _ => None,
            })
            .collect()
    }
}

pub struct MockSpeech {
    log: CallLog,
}

#[async_trait]
impl SpeechOutput for MockSpeech {
    async fn say(
        &self,
        text: &str,
        voice: TtsVoice,
        allow_interruptions: bool,
    ) -> Result<(), VoiceError> {
        self.log.push(Call::Say {
            text: text.to_string(),
            voice,
            allow_interruptions,
        });
        Ok(())
    }
}

/// Returns queued turns in order; an empty queue yields an empty reply.
pub struct MockModel {
    log: CallLog,
    turns: Mutex<VecDeque<Result<ModelTurn, VoiceError>>>,
}

impl MockModel {
    pub fn queue(&self, turn: ModelTurn) {
        self.turns.lock().unwrap().push_back(Ok(turn));
    }

    pub fn queue_error(&self, error: VoiceError) {
        self.turns.lock().unwrap().push_back(Err(error));
    }
}

#[async_trait]
impl DialogueModel for MockModel {
    async fn respond(
        &self,
        context: &ChatContext,
        tools: &[ToolDefinition],
        instructions: Option<&str>,
    ) -> Result<ModelTurn, VoiceError> {
        self.log.push(Call::Respond {
            instructions: instructions.map(str::to_string),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            system: context.instructions().map(str::to_string),
        });
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelTurn::Reply(String::new())))
    }
}

pub struct MockRoom {
    log: CallLog,
    fail: bool,
}

#[async_trait]
impl RoomControl for MockRoom {
    async fn delete_room(&self, room: &str) -> Result<(), VoiceError> {
        self.log.push(Call::DeleteRoom(room.to_string()));
        if self.fail {
            return Err(VoiceError::RoomService("room not found".to_string()));
        }
        Ok(())
    }
}

pub struct MockThinking {
    log: CallLog,
}

#[async_trait]
impl ThinkingIndicator for MockThinking {
    async fn thinking_started(&self) -> Result<(), VoiceError> {
        self.log.push(Call::ThinkingStarted);
        Ok(())
    }

    fn thinking_stopped(&self) {
        self.log.push(Call::ThinkingStopped);
    }
}

pub struct Mocks {
    pub log: CallLog,
    pub model: Arc<MockModel>,
    pub ports: SessionPorts,
}

pub fn mocks() -> Mocks {
    build(false)
}

/// Mocks whose room deletion fails.
pub fn mocks_with_failing_room() -> Mocks {
    build(true)
}

fn build(fail_room: bool) -> Mocks {
    let log = CallLog::default();
    let model = Arc::new(MockModel {
        log: log.clone(),
        turns: Mutex::new(VecDeque::new()),
    });
    let ports = SessionPorts {
        speech: Arc::new(MockSpeech { log: log.clone() }),
        model: model.clone(),
        room: Arc::new(MockRoom {
            log: log.clone(),
            fail: fail_room,
        }),
        thinking: Arc::new(MockThinking { log: log.clone() }),
    };
    Mocks { log, model, ports }
}
