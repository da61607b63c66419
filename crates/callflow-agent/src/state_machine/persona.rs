use super::AgentState;
use callflow_types::TtsVoice;

/// Static description of an agent: what it is told and how it sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub instructions: &'static str,
    pub voice: TtsVoice,
}

const CONSENT_COLLECTOR: Persona = Persona {
    instructions: "You are a voice AI agent with the singular task to collect positive \
                   recording consent from the user. If consent is not given, you must end the call.",
    voice: TtsVoice::Ash,
};

const HELPFUL_ASSISTANT: Persona = Persona {
    instructions: "You are a helpful voice AI assistant specialized in Health care related \
                   queries. Your name is Bhanu.",
    voice: TtsVoice::Sage,
};

impl AgentState {
    /// The persona speaking in this state. `Ended` has none.
    pub fn persona(self) -> Option<&'static Persona> {
        match self {
            AgentState::ConsentCollector => Some(&CONSENT_COLLECTOR),
            AgentState::HelpfulAssistant => Some(&HELPFUL_ASSISTANT),
            AgentState::Ended => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_live_state_has_its_own_voice() {
        let consent = AgentState::ConsentCollector.persona().unwrap();
        let assistant = AgentState::HelpfulAssistant.persona().unwrap();
        assert_eq!(consent.voice, TtsVoice::Ash);
        assert_eq!(assistant.voice, TtsVoice::Sage);
        assert!(assistant.instructions.contains("Bhanu"));
        assert!(AgentState::Ended.persona().is_none());
    }
}
