//! Session runtime: executes state-machine effects against external ports.

pub mod adapters;
mod session;
#[cfg(test)]
mod testing;
pub mod traits;

pub use session::{AgentSession, SessionError, SessionOptions, SessionPorts};
pub use traits::{DialogueModel, ModelTurn, RoomControl, SpeechOutput, ThinkingIndicator};
