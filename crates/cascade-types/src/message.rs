use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Open key/value bag attached to a message; shape varies by kind
/// (tool name and arguments for tool calls, step tags, error kind, ...).
pub type Metadata = HashMap<String, Value>;

/// Closed set of message kinds a session can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Thinking,
    Reasoning,
    ToolCall,
    ToolResult,
    FinalAnswer,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Reasoning => "reasoning",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
            Self::FinalAnswer => "final_answer",
            Self::Error => "error",
        }
    }

    /// Parse the on-disk/wire representation. Unknown values return None.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "thinking" => Some(Self::Thinking),
            "reasoning" => Some(Self::Reasoning),
            "tool_call" => Some(Self::ToolCall),
            "tool_result" => Some(Self::ToolResult),
            "final_answer" => Some(Self::FinalAnswer),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One unit of agent output within a session.
///
/// Created by exactly one step function at the moment that step executes,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach a metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// String-valued metadata lookup with empty-string default.
    pub fn metadata_str(&self, key: &str) -> String {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            MessageKind::Thinking,
            MessageKind::Reasoning,
            MessageKind::ToolCall,
            MessageKind::ToolResult,
            MessageKind::FinalAnswer,
            MessageKind::Error,
        ] {
            assert_eq!(MessageKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::parse("bogus"), None);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(MessageKind::FinalAnswer).unwrap();
        assert_eq!(v, json!("final_answer"));
    }

    #[test]
    fn message_builder_attaches_metadata() {
        let msg = Message::new(MessageKind::ToolCall, "Preparing to call tool")
            .with_metadata("tool_name", json!("add_numbers"))
            .with_metadata("tool_args", json!({"a": 1, "b": 2}));

        assert_eq!(msg.metadata_str("tool_name"), "add_numbers");
        assert_eq!(msg.metadata["tool_args"]["b"], json!(2));
        assert!(!msg.id.is_empty());
    }
}
