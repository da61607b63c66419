//! Effects produced by state transitions

/// Requests to external collaborators, executed in order by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Speak a fixed utterance with the active agent's voice.
    Say {
        text: String,
        allow_interruptions: bool,
    },

    /// Ask the dialogue model for the next reply. `None` lets the model
    /// answer from the conversation alone.
    GenerateReply { instructions: Option<String> },

    /// Delete the session's room, disconnecting everyone in it.
    DeleteRoom,
}

impl Effect {
    pub fn say(text: impl Into<String>) -> Self {
        Effect::Say {
            text: text.into(),
            allow_interruptions: true,
        }
    }

    /// An utterance the caller cannot barge in on.
    pub fn say_uninterruptible(text: impl Into<String>) -> Self {
        Effect::Say {
            text: text.into(),
            allow_interruptions: false,
        }
    }

    pub fn generate_reply(instructions: impl Into<String>) -> Self {
        Effect::GenerateReply {
            instructions: Some(instructions.into()),
        }
    }
}
