//! Voice infrastructure for callflow agents.
//!
//! Wraps the external collaborators a voice agent talks to: the LiveKit room
//! service (join tokens, room deletion), the agent's room participant, and
//! the OpenAI-compatible speech-to-text, text-to-speech and dialogue APIs.
//! Also provides the background-audio player used while the agent thinks.
//!
//! Nothing here knows about agent states; `callflow-agent` drives these
//! services through its runtime ports.

pub mod agent;
pub mod background;
pub mod config;
pub mod error;
pub mod llm;
pub mod service;
pub mod stt;
pub mod tts;

pub use agent::{AgentVoiceClient, RoomInputOptions, TranscriptionEvent};
pub use background::BackgroundAudioPlayer;
pub use config::{LiveKitConfig, OpenAiConfig};
pub use error::VoiceError;
pub use llm::{ChatClient, ChatCompletion, ToolDefinition};
pub use service::RoomService;
pub use stt::SttService;
pub use tts::TtsService;
