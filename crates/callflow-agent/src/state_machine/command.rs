//! Tool-style commands the dialogue model can trigger.

use super::AgentState;
use callflow_types::ToolCall;
use callflow_voice::ToolDefinition;
use serde_json::{json, Value};
use thiserror::Error;

/// A caller intent, as recognised by the dialogue model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The caller agreed to be recorded.
    ConsentGiven,
    /// The caller declined; hang up.
    EndCall,
    /// The caller told us their name. Any string is accepted.
    RecordName(String),
    /// The caller asked about their claims.
    GetClaims,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool {tool} is missing string argument `{argument}`")]
    MissingArgument {
        tool: &'static str,
        argument: &'static str,
    },
}

const ON_CONSENT_GIVEN: &str = "on_consent_given";
const END_CALL: &str = "end_call";
const RECORD_NAME: &str = "record_name";
const GET_CLAIMS: &str = "get_claims";

impl Command {
    /// Name of the tool that carries this command.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Command::ConsentGiven => ON_CONSENT_GIVEN,
            Command::EndCall => END_CALL,
            Command::RecordName(_) => RECORD_NAME,
            Command::GetClaims => GET_CLAIMS,
        }
    }

    /// Whether `state` exposes this command to the model.
    pub fn available_in(&self, state: AgentState) -> bool {
        matches!(
            (state, self),
            (AgentState::ConsentCollector, Command::ConsentGiven | Command::EndCall)
                | (
                    AgentState::HelpfulAssistant,
                    Command::RecordName(_) | Command::GetClaims
                )
        )
    }

    /// Parses a model tool call into a command.
    pub fn from_tool_call(call: &ToolCall) -> Result<Self, CommandError> {
        match call.name.as_str() {
            ON_CONSENT_GIVEN => Ok(Command::ConsentGiven),
            END_CALL => Ok(Command::EndCall),
            GET_CLAIMS => Ok(Command::GetClaims),
            RECORD_NAME => call
                .arguments
                .get("name")
                .and_then(Value::as_str)
                .map(|name| Command::RecordName(name.to_string()))
                .ok_or(CommandError::MissingArgument {
                    tool: RECORD_NAME,
                    argument: "name",
                }),
            other => Err(CommandError::UnknownTool(other.to_string())),
        }
    }
}

fn no_parameters() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

/// Tools offered to the model while `state` is active.
pub fn tool_definitions(state: AgentState) -> Vec<ToolDefinition> {
    match state {
        AgentState::ConsentCollector => vec![
            ToolDefinition {
                name: ON_CONSENT_GIVEN.to_string(),
                description: "Use this tool to indicate that consent has been given and the \
                              call may proceed."
                    .to_string(),
                parameters: no_parameters(),
            },
            ToolDefinition {
                name: END_CALL.to_string(),
                description: "Use this tool to indicate that consent has not been given and \
                              the call should end."
                    .to_string(),
                parameters: no_parameters(),
            },
        ],
        AgentState::HelpfulAssistant => vec![
            ToolDefinition {
                name: RECORD_NAME.to_string(),
                description: "Use this tool to record the user's name.".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "The user's name." }
                    },
                    "required": ["name"]
                }),
            },
            ToolDefinition {
                name: GET_CLAIMS.to_string(),
                description: "Use this tool to provide claim related details.".to_string(),
                parameters: no_parameters(),
            },
        ],
        AgentState::Ended => Vec::new(),
    }
}
