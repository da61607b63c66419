//! One call: the active agent, its conversation and the ports it drives.

use super::traits::{DialogueModel, ModelTurn, RoomControl, SpeechOutput, ThinkingIndicator};
use crate::state_machine::{
    enter, tool_definitions, transition, AgentState, Command, CommandError, Effect, Transition,
    TransitionError,
};
use callflow_types::{ChatContext, ChatRole, ToolCall, TtsVoice, TurnDetection, UserInfo};
use callflow_voice::VoiceError;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on model requests triggered by one inbound event. Stops a
/// model that keeps calling reply-generating tools from looping forever.
const MAX_CHAINED_REPLIES: usize = 8;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("session has not been started")]
    NotStarted,

    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// A mistake in a model tool call, as opposed to a collaborator failure.
    pub fn is_tool_error(&self) -> bool {
        matches!(self, Self::Command(_) | Self::Transition(_))
    }
}

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct SessionPorts {
    pub speech: Arc<dyn SpeechOutput>,
    pub model: Arc<dyn DialogueModel>,
    pub room: Arc<dyn RoomControl>,
    pub thinking: Arc<dyn ThinkingIndicator>,
}

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub turn_detection: TurnDetection,
}

pub struct AgentSession {
    room_name: String,
    options: SessionOptions,
    state: Option<AgentState>,
    /// Voice of the last agent that held control. Outlives `Ended` so the
    /// farewell is spoken by the agent that ended the call.
    voice: TtsVoice,
    context: ChatContext,
    userdata: UserInfo,
    ports: SessionPorts,
}

impl AgentSession {
    pub fn new(
        room_name: impl Into<String>,
        userdata: UserInfo,
        options: SessionOptions,
        ports: SessionPorts,
    ) -> Self {
        Self {
            room_name: room_name.into(),
            options,
            state: None,
            voice: TtsVoice::default(),
            context: ChatContext::new(),
            userdata,
            ports,
        }
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// The active agent, `None` before `start`.
    pub fn state(&self) -> Option<AgentState> {
        self.state
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn userdata(&self) -> &UserInfo {
        &self.userdata
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_some_and(AgentState::is_terminal)
    }

    /// Puts `initial` in control and runs its on-entry effects.
    pub async fn start(&mut self, initial: AgentState) -> Result<(), SessionError> {
        if self.state.is_some() {
            warn!(room = %self.room_name, "session already started");
            return Ok(());
        }
        info!(
            room = %self.room_name,
            agent = %initial,
            turn_detection = ?self.options.turn_detection,
            "starting session"
        );
        let effects = self.enter(initial);
        self.run(effects).await
    }

    /// Asks the model for a reply, optionally steered by `instructions`.
    pub async fn generate_reply(&mut self, instructions: Option<&str>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.run(vec![Effect::GenerateReply {
            instructions: instructions.map(str::to_string),
        }])
        .await
    }

    /// Records a finished caller utterance and lets the agent respond.
    pub async fn handle_user_turn(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        debug!(room = %self.room_name, text, "user turn");
        self.context.add_message(ChatRole::User, text);
        self.generate_reply(None).await
    }

    /// Applies `command` directly, bypassing the model.
    pub async fn dispatch(&mut self, command: Command) -> Result<(), SessionError> {
        self.ensure_open()?;
        let effects = self.apply(command)?;
        self.run(effects).await
    }

    fn ensure_open(&self) -> Result<AgentState, SessionError> {
        match self.state {
            None => Err(SessionError::NotStarted),
            Some(AgentState::Ended) => Err(SessionError::Closed),
            Some(state) => Ok(state),
        }
    }

    fn enter(&mut self, state: AgentState) -> Vec<Effect> {
        self.state = Some(state);
        if let Some(persona) = state.persona() {
            self.voice = persona.voice;
            self.context.set_instructions(persona.instructions);
        }
        info!(room = %self.room_name, agent = %state, "agent entered");
        enter(state)
    }

    /// Runs the state machine for `command` and returns the effects to execute.
    fn apply(&mut self, command: Command) -> Result<Vec<Effect>, SessionError> {
        let state = self.ensure_open()?;
        let tool = command.tool_name();
        let context = std::mem::take(&mut self.context);

        match transition(state, &mut self.userdata, context, command) {
            Ok(Transition::Stay { context, effects }) => {
                self.context = context;
                debug!(room = %self.room_name, agent = %state, tool, "command handled");
                Ok(effects)
            }
            Ok(Transition::TransitionTo {
                state: next,
                context,
            }) => {
                self.context = context;
                info!(room = %self.room_name, from = %state, to = %next, "agent hand-off");
                Ok(self.enter(next))
            }
            Ok(Transition::Terminate { context, effects }) => {
                self.context = context;
                self.state = Some(AgentState::Ended);
                info!(room = %self.room_name, from = %state, tool, "call ending");
                Ok(effects)
            }
            Err(rejected) => {
                self.context = rejected.context;
                Err(rejected.error.into())
            }
        }
    }

    /// Records a model tool call, applies it and records its outcome. A
    /// rejected call leaves its error as the function output.
    fn apply_tool_call(&mut self, call: ToolCall) -> Result<Vec<Effect>, SessionError> {
        self.context.add_function_call(call.clone());
        let before = self.state;

        let result = Command::from_tool_call(&call)
            .map_err(SessionError::from)
            .and_then(|command| self.apply(command));

        let output = match (&result, before, self.state) {
            (Err(e), _, _) => format!("error: {}", e),
            (Ok(_), Some(from), Some(to)) if from != to => format!("transferred to {}", to),
            (Ok(_), _, _) => "ok".to_string(),
        };
        self.context.add_function_output(&call.id, &call.name, output);
        result
    }

    /// Executes effects in order. Effects produced while running (tool
    /// dispatch, hand-off entry) run before anything still queued.
    async fn run(&mut self, effects: Vec<Effect>) -> Result<(), SessionError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut replies = 0;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Say {
                    text,
                    allow_interruptions,
                } => self.say(&text, allow_interruptions).await?,

                Effect::DeleteRoom => {
                    info!(room = %self.room_name, "deleting room");
                    self.ports.room.delete_room(&self.room_name).await?;
                }

                Effect::GenerateReply { instructions } => {
                    let Some(state) = self.state.filter(|s| !s.is_terminal()) else {
                        debug!(room = %self.room_name, "skipping reply after call ended");
                        continue;
                    };
                    replies += 1;
                    if replies > MAX_CHAINED_REPLIES {
                        warn!(room = %self.room_name, "reply chain limit reached");
                        continue;
                    }

                    match self.request_turn(state, instructions.as_deref()).await? {
                        ModelTurn::Reply(text) => {
                            if !text.trim().is_empty() {
                                queue.push_front(Effect::say(text));
                            }
                        }
                        ModelTurn::Tools(calls) => {
                            let mut produced = Vec::new();
                            let mut rejected = false;
                            for call in calls {
                                if self.is_closed() {
                                    warn!(tool = %call.name, "ignoring tool call after call ended");
                                    break;
                                }
                                match self.apply_tool_call(call) {
                                    Ok(effects) => produced.extend(effects),
                                    Err(e) if e.is_tool_error() => {
                                        warn!(room = %self.room_name, error = %e, "tool call rejected");
                                        rejected = true;
                                    }
                                    Err(e) => return Err(e),
                                }
                            }
                            // The model sees the recorded error output on its next turn.
                            if rejected
                                && !self.is_closed()
                                && !produced
                                    .iter()
                                    .any(|e| matches!(e, Effect::GenerateReply { .. }))
                            {
                                produced.push(Effect::GenerateReply { instructions: None });
                            }
                            for effect in produced.into_iter().rev() {
                                queue.push_front(effect);
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn request_turn(
        &self,
        state: AgentState,
        instructions: Option<&str>,
    ) -> Result<ModelTurn, SessionError> {
        let tools = tool_definitions(state);

        self.ports.thinking.thinking_started().await?;
        let turn = self
            .ports
            .model
            .respond(&self.context, &tools, instructions)
            .await;
        self.ports.thinking.thinking_stopped();

        Ok(turn?)
    }

    async fn say(&mut self, text: &str, allow_interruptions: bool) -> Result<(), SessionError> {
        self.context.add_message(ChatRole::Assistant, text);
        self.ports
            .speech
            .say(text, self.voice, allow_interruptions)
            .await?;
        Ok(())
    }
}
