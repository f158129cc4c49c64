// OpenAI-compatible client implementation (HTTP direct, no SDK)

use crate::reply::ModelReply;
use crate::traits::{ChatClient, ChatRequest};
use crate::types::{ChatMessage, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAIChatClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIChatClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_payload(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(convert_message).collect();

        let mut payload = serde_json::json!({
            "model": request.model,
            "messages": messages,
        });

        let obj = payload.as_object_mut().expect("payload is an object");

        if let Some(temp) = request.options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(tools) = &request.options.tools {
            let defs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        },
                    })
                })
                .collect();
            obj.insert("tools".to_string(), Value::Array(defs));
            obj.insert("tool_choice".to_string(), serde_json::json!("auto"));
        }

        payload
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ModelReply> {
        let payload = self.build_payload(&request);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %request.model, "sending chat completion request");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion failed ({}): {}", status, body);
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .context("Chat completion returned no choices")?;

        Ok(into_reply(choice.message))
    }
}

/// Convert the assistant message into the reply union. An absent or empty
/// tool-call list means a plain answer.
fn into_reply(message: WireMessage) -> ModelReply {
    let text = message.content.unwrap_or_default();
    let calls: Vec<ToolCall> = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            // Arguments arrive as a JSON string; a malformed one degrades to
            // an empty object rather than failing the whole reply.
            arguments: serde_json::from_str(&tc.function.arguments)
                .unwrap_or_else(|_| serde_json::json!({})),
        })
        .collect();

    if calls.is_empty() {
        ModelReply::Answer { text }
    } else {
        ModelReply::ToolUse {
            text,
            requested_calls: calls,
        }
    }
}

fn convert_message(message: &ChatMessage) -> Value {
    match message {
        ChatMessage::System { content } => serde_json::json!({
            "role": "system",
            "content": content,
        }),
        ChatMessage::Human { content } => serde_json::json!({
            "role": "user",
            "content": content,
        }),
        ChatMessage::AI {
            content,
            tool_calls,
        } => {
            let mut obj = serde_json::json!({
                "role": "assistant",
                "content": content.clone().unwrap_or_default(),
            });
            if let Some(calls) = tool_calls {
                let wire: Vec<Value> = calls
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "type": "function",
                            "function": {
                                "name": c.name,
                                "arguments": c.arguments.to_string(),
                            },
                        })
                    })
                    .collect();
                obj.as_object_mut()
                    .expect("message is an object")
                    .insert("tool_calls".to_string(), Value::Array(wire));
            }
            obj
        }
        ChatMessage::Tool {
            tool_call_id,
            content,
        } => serde_json::json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        }),
    }
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
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}
