//! Conversation state machine for the call flow.
//!
//! States, commands and effects are plain data; `transition` is a pure
//! function from (state, command) to the next state and the effects the
//! runtime must execute, in order.

mod command;
mod effect;
mod persona;
mod state;
mod transition;

pub use command::{tool_definitions, Command, CommandError};
pub use effect::Effect;
pub use persona::Persona;
pub use state::AgentState;
pub use transition::{enter, transition, Rejected, Transition, TransitionError, CLAIM_COUNT};
