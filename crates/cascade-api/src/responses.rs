use cascade_types::{Message, MessageKind, Metadata, Session, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of the line-delimited JSON stream: either a normal stream
/// element or a terminal error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamFrame {
    Stream(StreamPayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamPayload {
    pub message_id: String,
    pub message_type: MessageKind,
    pub content: String,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub error_type: String,
}

impl StreamFrame {
    pub fn from_message(message: &Message) -> Self {
        Self::Stream(StreamPayload {
            message_id: message.id.clone(),
            message_type: message.kind,
            content: message.content.clone(),
            metadata: message.metadata.clone(),
            timestamp: message.timestamp,
        })
    }

    pub fn error(error: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            error: error.into(),
            error_type: error_type.into(),
        })
    }

    /// Serialize to a single well-formed JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize stream frame");
            r#"{"type":"error","data":{"error":"frame serialization failed","error_type":"serialization_error"}}"#
                .to_string()
        })
    }
}

/// Full history of one session, grouped by message kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistory {
    pub session: SessionEnvelope,
    pub conversation_flow: ConversationFlow,
    pub summary: SessionSummaryStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub session_id: String,
    pub question: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationFlow {
    pub thinking_steps: Vec<ThinkingStep>,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub tool_operations: Vec<ToolOperation>,
    pub tool_results: Vec<ToolResultEntry>,
    pub final_answers: Vec<FinalAnswerEntry>,
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub content: String,
    pub metadata: Metadata,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOperation {
    pub content: String,
    pub tool_name: String,
    pub tool_args: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEntry {
    pub content: String,
    pub call_id: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswerEntry {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub content: String,
    pub error_type: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummaryStats {
    pub total_messages: usize,
    pub tools_used: usize,
    pub has_errors: bool,
    pub completion_status: SessionStatus,
}

impl SessionHistory {
    pub fn from_session(session: &Session) -> Self {
        let mut flow = ConversationFlow::default();

        for msg in &session.messages {
            match msg.kind {
                MessageKind::Thinking => flow.thinking_steps.push(ThinkingStep {
                    content: msg.content.clone(),
                    timestamp: msg.timestamp,
                }),
                MessageKind::Reasoning => flow.reasoning_steps.push(ReasoningStep {
                    content: msg.content.clone(),
                    metadata: msg.metadata.clone(),
                    timestamp: msg.timestamp,
                }),
                MessageKind::ToolCall => flow.tool_operations.push(ToolOperation {
                    content: msg.content.clone(),
                    tool_name: msg.metadata_str("tool_name"),
                    tool_args: msg
                        .metadata
                        .get("tool_args")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Default::default())),
                    timestamp: msg.timestamp,
                }),
                MessageKind::ToolResult => flow.tool_results.push(ToolResultEntry {
                    content: msg.content.clone(),
                    call_id: msg.metadata_str("call_id"),
                    success: msg
                        .metadata
                        .get("success")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    timestamp: msg.timestamp,
                }),
                MessageKind::FinalAnswer => flow.final_answers.push(FinalAnswerEntry {
                    content: msg.content.clone(),
                    timestamp: msg.timestamp,
                }),
                MessageKind::Error => flow.errors.push(ErrorEntry {
                    content: msg.content.clone(),
                    error_type: msg.metadata_str("error_type"),
                    timestamp: msg.timestamp,
                }),
            }
        }

        let summary = SessionSummaryStats {
            total_messages: session.message_count(),
            tools_used: flow.tool_operations.len(),
            has_errors: !flow.errors.is_empty(),
            completion_status: session.status,
        };

        Self {
            session: SessionEnvelope {
                session_id: session.session_id.clone(),
                question: session.user_question.clone(),
                status: session.status,
                created_at: session.created_at,
                updated_at: session.updated_at,
            },
            conversation_flow: flow,
            summary,
        }
    }
}

/// Summary listing of all known sessions, in creation (file) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    pub total_sessions: usize,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub question: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            question: session.user_question.clone(),
            status: session.status,
            created_at: session.created_at,
            message_count: session.message_count(),
        }
    }
}
