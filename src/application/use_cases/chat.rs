use std::sync::Arc;

use futures::channel::mpsc::UnboundedSender;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::application::ports::ChatModel;
use crate::application::ports::chat_model::{ChatMessage, ChatRole, ToolDefinition};
use crate::application::use_cases::add_resource::AddResourceUseCase;
use crate::application::use_cases::find_relevant_content::FindRelevantContentUseCase;

pub const MAX_STEPS: usize = 3;

pub const ADD_RESOURCE_TOOL: &str = "addResource";
pub const GET_INFORMATION_TOOL: &str = "getInformation";

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that can talk with the user about any topic.

When answering questions, check your knowledge base first and use the information returned by tool calls.
If the tool calls return no relevant information, say honestly that you don't know.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Progress of one chat turn, streamed to the client as it happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatEvent {
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    ToolResult {
        id: String,
        name: String,
        result: Value,
    },
    Text {
        content: String,
    },
    Error {
        message: String,
    },
    Finish {
        #[serde(rename = "finishReason")]
        finish_reason: String,
        steps: usize,
    },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::ToolCall { .. } => "tool-call",
            ChatEvent::ToolResult { .. } => "tool-result",
            ChatEvent::Text { .. } => "text",
            ChatEvent::Error { .. } => "error",
            ChatEvent::Finish { .. } => "finish",
        }
    }
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ADD_RESOURCE_TOOL.to_string(),
            description: "Add a resource to your knowledge base. If the user provides a piece \
                          of information unprompted, use this tool without asking for confirmation."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "the content or resource to add to the knowledge base"
                    }
                },
                "required": ["content"]
            }),
        },
        ToolDefinition {
            name: GET_INFORMATION_TOOL.to_string(),
            description: "Get information from your knowledge base to answer questions."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "the user's question"
                    }
                },
                "required": ["question"]
            }),
        },
    ]
}

pub struct ChatUseCase {
    chat_model: Arc<dyn ChatModel>,
    add_resource: Arc<AddResourceUseCase>,
    find_relevant_content: Arc<FindRelevantContentUseCase>,
    max_steps: usize,
}

impl ChatUseCase {
    pub fn new(
        chat_model: Arc<dyn ChatModel>,
        add_resource: Arc<AddResourceUseCase>,
        find_relevant_content: Arc<FindRelevantContentUseCase>,
    ) -> Self {
        Self {
            chat_model,
            add_resource,
            find_relevant_content,
            max_steps: MAX_STEPS,
        }
    }

    /// Rejects conversations that cannot be sent to the model at all.
    pub fn validate(&self, messages: &[ChatMessage]) -> Result<(), ChatError> {
        if messages.is_empty() {
            return Err(ChatError::ValidationError(
                "At least one message is required".to_string(),
            ));
        }
        if messages
            .iter()
            .any(|m| matches!(m.role, ChatRole::Tool) || m.content.is_none())
        {
            return Err(ChatError::ValidationError(
                "Messages must have a role of system, user or assistant and text content"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the tool loop, pushing every event into `events`. Stops early
    /// when the receiving side goes away.
    pub async fn run(&self, messages: Vec<ChatMessage>, events: UnboundedSender<ChatEvent>) {
        let tools = tool_definitions();
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(SYSTEM_PROMPT));
        conversation.extend(messages);

        for step in 1..=self.max_steps {
            if events.is_closed() {
                info!(step, "Chat client disconnected");
                return;
            }

            let turn = match self.chat_model.complete(&conversation, &tools).await {
                Ok(turn) => turn,
                Err(e) => {
                    warn!(step, error = %e, "Chat completion failed");
                    let _ = events.unbounded_send(ChatEvent::Error {
                        message: e.to_string(),
                    });
                    return;
                }
            };

            if let Some(text) = turn.content.as_deref().filter(|t| !t.is_empty()) {
                let _ = events.unbounded_send(ChatEvent::Text {
                    content: text.to_string(),
                });
            }

            if turn.tool_calls.is_empty() {
                let _ = events.unbounded_send(ChatEvent::Finish {
                    finish_reason: turn.finish_reason.unwrap_or_else(|| "stop".to_string()),
                    steps: step,
                });
                return;
            }

            let calls = turn.tool_calls.clone();
            conversation.push(turn.into_message());

            for call in calls {
                let arguments: Value =
                    serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);

                info!(step, tool = %call.function.name, "Model requested tool");
                let _ = events.unbounded_send(ChatEvent::ToolCall {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    arguments: arguments.clone(),
                });

                let result = self.invoke_tool(&call.function.name, &arguments).await;

                let _ = events.unbounded_send(ChatEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    result: result.clone(),
                });
                conversation.push(ChatMessage::tool_result(call.id, result.to_string()));
            }
        }

        let _ = events.unbounded_send(ChatEvent::Finish {
            finish_reason: "max-steps".to_string(),
            steps: self.max_steps,
        });
    }

    async fn invoke_tool(&self, name: &str, arguments: &Value) -> Value {
        match name {
            ADD_RESOURCE_TOOL => match arguments.get("content").and_then(Value::as_str) {
                Some(content) => to_json(&self.add_resource.execute(content).await),
                None => tool_error("Missing string argument: content"),
            },
            GET_INFORMATION_TOOL => match arguments.get("question").and_then(Value::as_str) {
                Some(question) => to_json(&self.find_relevant_content.execute(question).await),
                None => tool_error("Missing string argument: question"),
            },
            other => tool_error(&format!("Unknown tool: {}", other)),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| tool_error(&e.to_string()))
}

fn tool_error(message: &str) -> Value {
    json!({ "success": false, "error": message })
}
