//! Chat context carried across agent hand-offs.
//!
//! A `ChatContext` is an ordered list of items. It is owned by the running
//! session and moved (never cloned) into the next agent state on hand-off,
//! so its `id` identifies one conversation for its whole lifetime.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A tool invocation requested by the dialogue model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments. `{}` when the tool takes none.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatItem {
    Message { role: ChatRole, content: String },
    FunctionCall(ToolCall),
    FunctionOutput {
        call_id: String,
        name: String,
        output: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    id: Uuid,
    items: Vec<ChatItem>,
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
        }
    }

    /// Identifier of this conversation. Stable across hand-offs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[ChatItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.items.push(ChatItem::Message {
            role,
            content: content.into(),
        });
    }

    pub fn add_function_call(&mut self, call: ToolCall) {
        self.items.push(ChatItem::FunctionCall(call));
    }

    pub fn add_function_output(
        &mut self,
        call_id: impl Into<String>,
        name: impl Into<String>,
        output: impl Into<String>,
    ) {
        self.items.push(ChatItem::FunctionOutput {
            call_id: call_id.into(),
            name: name.into(),
            output: output.into(),
        });
    }

    /// Installs the active agent's instructions as the leading system message,
    /// replacing the previous agent's instructions if present. History after
    /// it is untouched.
    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        let message = ChatItem::Message {
            role: ChatRole::System,
            content: instructions.into(),
        };
        match self.items.first() {
            Some(ChatItem::Message {
                role: ChatRole::System,
                ..
            }) => self.items[0] = message,
            _ => self.items.insert(0, message),
        }
    }

    /// The system instructions currently installed, if any.
    pub fn instructions(&self) -> Option<&str> {
        match self.items.first() {
            Some(ChatItem::Message {
                role: ChatRole::System,
                content,
            }) => Some(content),
            _ => None,
        }
    }

    /// Content of the most recent message (any role), skipping tool items.
    pub fn last_message(&self) -> Option<(ChatRole, &str)> {
        self.items.iter().rev().find_map(|item| match item {
            ChatItem::Message { role, content } => Some((*role, content.as_str())),
            _ => None,
        })
    }
}
