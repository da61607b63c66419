//! Pure state transition function
//!
//! Given the active state, the caller's session record, the conversation
//! and a command, decide what happens next. No I/O happens here; every
//! outward action is returned as an `Effect`.

use super::{AgentState, Command, Effect};
use callflow_types::{ChatContext, UserInfo};
use thiserror::Error;

/// Pending claims reported to every caller.
pub const CLAIM_COUNT: u32 = 2;

const WELCOME: &str = "Welcome to ABC Health insurance member services?";
const ASSISTANT_INTRO: &str = "Hello! My name is Bhanu specialized in Health care related \
                               queries. How can I help you today?";
const ASK_NAME: &str = "Can you provide me your name?";
const FAREWELL: &str = "Thank you for your time, have a wonderful day.";

/// Outcome of applying a command.
#[derive(Debug)]
pub enum Transition {
    /// Same agent keeps control.
    Stay {
        context: ChatContext,
        effects: Vec<Effect>,
    },
    /// Control and the conversation move to `state`. The new state's
    /// on-entry effects come from [`enter`].
    TransitionTo {
        state: AgentState,
        context: ChatContext,
    },
    /// The call ends after `effects` run.
    Terminate {
        context: ChatContext,
        effects: Vec<Effect>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{command} is not available while {state} is active")]
    Unavailable {
        state: AgentState,
        command: &'static str,
    },
    #[error("the call has ended")]
    Ended,
}

/// A refused command. Hands the conversation back untouched.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    pub error: TransitionError,
    pub context: ChatContext,
}

/// Effects to run when `state` takes control.
pub fn enter(state: AgentState) -> Vec<Effect> {
    match state {
        AgentState::ConsentCollector => vec![Effect::say(WELCOME)],
        AgentState::HelpfulAssistant => vec![
            Effect::say(ASSISTANT_INTRO),
            Effect::say_uninterruptible(ASK_NAME),
        ],
        AgentState::Ended => Vec::new(),
    }
}

/// Applies `command` in `state`.
///
/// `user` is only written by `RecordName`. `context` is moved through and
/// returned in every outcome, including rejection.
pub fn transition(
    state: AgentState,
    user: &mut UserInfo,
    context: ChatContext,
    command: Command,
) -> Result<Transition, Rejected> {
    match (state, command) {
        (AgentState::ConsentCollector, Command::ConsentGiven) => Ok(Transition::TransitionTo {
            state: AgentState::HelpfulAssistant,
            context,
        }),

        // Farewell must be spoken before the room goes away.
        (AgentState::ConsentCollector, Command::EndCall) => Ok(Transition::Terminate {
            context,
            effects: vec![Effect::say(FAREWELL), Effect::DeleteRoom],
        }),

        (AgentState::HelpfulAssistant, Command::RecordName(name)) => {
            user.user_name = name;
            Ok(Transition::Stay {
                context,
                effects: vec![Effect::generate_reply(format!(
                    "Greet {} and ask them what health care related details they are looking for.",
                    user.user_name
                ))],
            })
        }

        // No guard on a missing name: the reply names whatever is stored,
        // possibly the empty default.
        (AgentState::HelpfulAssistant, Command::GetClaims) => Ok(Transition::Stay {
            context,
            effects: vec![Effect::generate_reply(format!(
                "Greet {} and tell them they have {} pending claims.",
                user.user_name, CLAIM_COUNT
            ))],
        }),

        (AgentState::Ended, _) => Err(Rejected {
            error: TransitionError::Ended,
            context,
        }),

        (state, command) => Err(Rejected {
            error: TransitionError::Unavailable {
                state,
                command: command.tool_name(),
            },
            context,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callflow_types::ChatRole;

    fn ctx_with_history() -> ChatContext {
        let mut ctx = ChatContext::new();
        ctx.add_message(ChatRole::Assistant, WELCOME);
        ctx.add_message(ChatRole::User, "Yes, that's fine.");
        ctx
    }

    fn instructions_of(effects: &[Effect]) -> &str {
        match effects {
            [Effect::GenerateReply {
                instructions: Some(text),
            }] => text,
            other => panic!("expected a single GenerateReply, got {:?}", other),
        }
    }

    #[test]
    fn consent_hands_off_with_same_context() {
        let ctx = ctx_with_history();
        let id = ctx.id();
        let mut user = UserInfo::default();

        match transition(AgentState::ConsentCollector, &mut user, ctx, Command::ConsentGiven) {
            Ok(Transition::TransitionTo { state, context }) => {
                assert_eq!(state, AgentState::HelpfulAssistant);
                assert_eq!(context.id(), id);
                assert_eq!(context.len(), 2);
            }
            other => panic!("expected hand-off, got {:?}", other),
        }
    }

    #[test]
    fn end_call_says_farewell_before_deleting_room() {
        let mut user = UserInfo::default();
        match transition(
            AgentState::ConsentCollector,
            &mut user,
            ChatContext::new(),
            Command::EndCall,
        ) {
            Ok(Transition::Terminate { effects, .. }) => {
                assert_eq!(effects, vec![Effect::say(FAREWELL), Effect::DeleteRoom]);
            }
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn record_name_stores_and_greets() {
        let mut user = UserInfo::default();
        let result = transition(
            AgentState::HelpfulAssistant,
            &mut user,
            ChatContext::new(),
            Command::RecordName("Alice".to_string()),
        );

        assert_eq!(user.user_name, "Alice");
        match result {
            Ok(Transition::Stay { effects, .. }) => {
                assert!(instructions_of(&effects).contains("Greet Alice"));
            }
            other => panic!("expected stay, got {:?}", other),
        }
    }

    #[test]
    fn get_claims_mentions_name_and_count() {
        let mut user = UserInfo {
            user_name: "Alice".to_string(),
        };
        match transition(
            AgentState::HelpfulAssistant,
            &mut user,
            ChatContext::new(),
            Command::GetClaims,
        ) {
            Ok(Transition::Stay { effects, .. }) => {
                let text = instructions_of(&effects);
                assert!(text.contains("Alice"));
                assert!(text.contains("2 pending claims"));
            }
            other => panic!("expected stay, got {:?}", other),
        }
    }

    #[test]
    fn get_claims_without_name_uses_empty_default() {
        let mut user = UserInfo::default();
        match transition(
            AgentState::HelpfulAssistant,
            &mut user,
            ChatContext::new(),
            Command::GetClaims,
        ) {
            Ok(Transition::Stay { effects, .. }) => {
                assert_eq!(user.user_name, "");
                assert_eq!(
                    instructions_of(&effects),
                    "Greet  and tell them they have 2 pending claims."
                );
            }
            other => panic!("expected stay, got {:?}", other),
        }
    }

    #[test]
    fn unavailable_command_returns_context() {
        let ctx = ctx_with_history();
        let id = ctx.id();
        let mut user = UserInfo::default();

        let rejected = transition(
            AgentState::ConsentCollector,
            &mut user,
            ctx,
            Command::RecordName("Mallory".to_string()),
        )
        .unwrap_err();

        assert_eq!(
            rejected.error,
            TransitionError::Unavailable {
                state: AgentState::ConsentCollector,
                command: "record_name",
            }
        );
        assert_eq!(rejected.context.id(), id);
        assert_eq!(user.user_name, "");
    }

    #[test]
    fn assistant_cannot_hand_back() {
        let mut user = UserInfo::default();
        let rejected = transition(
            AgentState::HelpfulAssistant,
            &mut user,
            ChatContext::new(),
            Command::ConsentGiven,
        )
        .unwrap_err();
        assert!(matches!(rejected.error, TransitionError::Unavailable { .. }));
    }

    #[test]
    fn ended_rejects_everything() {
        let mut user = UserInfo::default();
        for command in [
            Command::ConsentGiven,
            Command::EndCall,
            Command::RecordName("x".to_string()),
            Command::GetClaims,
        ] {
            let rejected =
                transition(AgentState::Ended, &mut user, ChatContext::new(), command).unwrap_err();
            assert_eq!(rejected.error, TransitionError::Ended);
        }
    }

    #[test]
    fn on_entry_effects() {
        assert_eq!(enter(AgentState::ConsentCollector), vec![Effect::say(WELCOME)]);
        assert_eq!(
            enter(AgentState::HelpfulAssistant),
            vec![
                Effect::say(ASSISTANT_INTRO),
                Effect::say_uninterruptible(ASK_NAME)
            ]
        );
        assert!(enter(AgentState::Ended).is_empty());
    }
}
