//! Consent-gated voice call flow.
//!
//! A call starts with a consent collector. Once the caller agrees to be
//! recorded, control and the conversation so far pass to a health-care
//! assistant that records the caller's name and answers claim questions.
//! Declining ends the call and deletes the room.
//!
//! [`state_machine`] holds the pure transition logic; [`runtime`] drives it
//! against speech, dialogue and room-management ports.

pub mod runtime;
pub mod state_machine;

pub use runtime::{AgentSession, SessionError, SessionOptions, SessionPorts};
pub use state_machine::{AgentState, Command, Effect, Transition};
