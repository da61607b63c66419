//! Chat-completions client with tool calling.
//!
//! The dialogue model decides, per turn, whether to answer with text or to
//! invoke one of the tools the active agent exposes.

use crate::config::{OpenAiConfig, DEFAULT_LLM_MODEL};
use crate::error::VoiceError;
use callflow_types::{ChatContext, ChatItem, ToolCall};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// A tool the model may call, described by a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// What the model produced for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatCompletion {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: OpenAiConfig,
    model: String,
}

impl ChatClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, VoiceError> {
        Self::with_model(config, DEFAULT_LLM_MODEL)
    }

    pub fn with_model(config: OpenAiConfig, model: impl Into<String>) -> Result<Self, VoiceError> {
        let client = Client::builder().timeout(LLM_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Requests the next turn for `context`.
    ///
    /// `instructions`, when given, is appended as a trailing system message
    /// for this request only; it is not written back into the context.
    pub async fn complete(
        &self,
        context: &ChatContext,
        tools: &[ToolDefinition],
        instructions: Option<&str>,
    ) -> Result<ChatCompletion, VoiceError> {
        let request = build_request(&self.model, context, tools, instructions);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = tools.len(),
            "requesting chat completion"
        );

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VoiceError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VoiceError::Llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(VoiceError::Llm(format!(
                    "HTTP {}: {}",
                    status, error.error.message
                )));
            }
            return Err(VoiceError::Llm(format!("HTTP {}: {}", status, body)));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| VoiceError::Llm(format!("Failed to parse response: {}", e)))?;

        normalize_response(parsed)
    }
}

fn build_request(
    model: &str,
    context: &ChatContext,
    tools: &[ToolDefinition],
    instructions: Option<&str>,
) -> CompletionRequest {
    let mut messages: Vec<WireMessage> = Vec::with_capacity(context.len() + 1);

    for item in context.items() {
        match item {
            ChatItem::Message { role, content } => messages.push(WireMessage {
                role: role.as_str().to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            }),
            ChatItem::FunctionCall(call) => {
                let wire = WireToolCall {
                    id: call.id.clone(),
                    r#type: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                };
                // Parallel calls share one assistant message.
                let open_calls = messages
                    .last_mut()
                    .filter(|m| m.role == "assistant" && m.content.is_none())
                    .and_then(|m| m.tool_calls.as_mut());
                match open_calls {
                    Some(calls) => calls.push(wire),
                    None => messages.push(WireMessage {
                        role: "assistant".to_string(),
                        content: None,
                        tool_calls: Some(vec![wire]),
                        tool_call_id: None,
                    }),
                }
            }
            ChatItem::FunctionOutput {
                call_id, output, ..
            } => messages.push(WireMessage {
                role: "tool".to_string(),
                content: Some(output.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            }),
        }
    }

    if let Some(text) = instructions {
        messages.push(WireMessage {
            role: "system".to_string(),
            content: Some(text.to_string()),
            tool_calls: None,
            tool_call_id: None,
        });
    }

    let tools = if tools.is_empty() {
        None
    } else {
        Some(
            tools
                .iter()
                .map(|t| WireTool {
                    r#type: "function".to_string(),
                    function: t.clone(),
                })
                .collect(),
        )
    };

    CompletionRequest {
        model: model.to_string(),
        messages,
        tools,
        stream: false,
    }
}

fn normalize_response(resp: CompletionResponse) -> Result<ChatCompletion, VoiceError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| VoiceError::Llm("No choices in response".to_string()))?;

    let text = choice.message.content.filter(|t| !t.trim().is_empty());

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .filter(|tc| !tc.function.name.is_empty())
        .map(|tc| {
            let arguments = if tc.function.arguments.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&tc.function.arguments)
                    .unwrap_or_else(|_| Value::Object(Default::default()))
            };
            ToolCall::new(tc.id, tc.function.name, arguments)
        })
        .collect();

    Ok(ChatCompletion { text, tool_calls })
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    r#type: String,
    function: ToolDefinition,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
