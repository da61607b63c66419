//! Shared types for the callflow workspace.
//!
//! This crate holds the data that crosses crate boundaries: the caller's
//! session record, the chat context that survives agent hand-offs, and the
//! voice/audio settings handed to the external speech collaborators.
//!
//! Nothing here performs I/O.

pub mod chat;
pub mod voice;

use serde::{Deserialize, Serialize};

pub use chat::{ChatContext, ChatItem, ChatRole, ToolCall};
pub use voice::{AudioConfig, BuiltinAudioClip, NoiseCancellation, TtsVoice, TurnDetection};

/// Facts collected about the caller during one session.
///
/// Created empty when the session starts and mutated only by state
/// transitions, which receive it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// The caller's name as they gave it. Empty until recorded.
    pub user_name: String,
}
