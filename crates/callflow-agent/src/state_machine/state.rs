use serde::{Deserialize, Serialize};
use std::fmt;

/// The conversational agent currently in control of the call.
///
/// Exactly one is active per session. Control only moves forward:
/// `ConsentCollector` → `HelpfulAssistant` or `ConsentCollector` → `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Opening agent: asks for recording consent.
    ConsentCollector,
    /// Health-care assistant, reachable only after consent.
    HelpfulAssistant,
    /// The call was ended. Terminal.
    Ended,
}

impl AgentState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConsentCollector => "consent_collector",
            Self::HelpfulAssistant => "helpful_assistant",
            Self::Ended => "ended",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
