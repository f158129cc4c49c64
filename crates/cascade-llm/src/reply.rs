use crate::types::ToolCall;
use serde::{Deserialize, Serialize};

/// What the model produced for one completion.
///
/// A reply is either a plain answer or an answer plus one or more structured
/// tool-invocation requests; callers branch on the variant instead of probing
/// for optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelReply {
    /// Free-text answer, no tool use requested.
    Answer { text: String },

    /// The model wants tools executed before it can finish.
    ToolUse {
        text: String,
        requested_calls: Vec<ToolCall>,
    },
}

impl ModelReply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer { text: text.into() }
    }

    pub fn tool_use(text: impl Into<String>, requested_calls: Vec<ToolCall>) -> Self {
        Self::ToolUse {
            text: text.into(),
            requested_calls,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Answer { text } => text,
            Self::ToolUse { text, .. } => text,
        }
    }

    pub fn requested_calls(&self) -> &[ToolCall] {
        match self {
            Self::Answer { .. } => &[],
            Self::ToolUse {
                requested_calls, ..
            } => requested_calls,
        }
    }

    /// True iff the reply carries one or more tool-invocation requests.
    /// An empty list counts as no tool use.
    pub fn has_tool_calls(&self) -> bool {
        !self.requested_calls().is_empty()
    }
}
