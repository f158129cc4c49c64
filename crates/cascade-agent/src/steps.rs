use cascade_llm::{ChatMessage, ModelReply, ToolCall};
use cascade_types::Session;
use serde_json::json;

/// Fixed instruction prepended to every model call.
pub const SYSTEM_PROMPT: &str = "You are a helpful math assistant. You can use the provided tools \
to perform calculations.\n\nWhen the user asks a question:\n1. Understand the question\n2. Decide \
whether a tool is needed\n3. If so, pick the right tool and say why\n4. Run the calculation\n5. \
Give the final answer\n\nAlways explain your thinking.";

/// The states of the reasoning machine.
///
/// `thinking -> reasoning -> {tool_calling -> tool_execution -> reasoning}
/// -> final_answer`, terminal at `final_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Thinking,
    Reasoning,
    ToolCalling,
    ToolExecution,
    FinalAnswer,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Reasoning => "reasoning",
            Self::ToolCalling => "tool_calling",
            Self::ToolExecution => "tool_execution",
            Self::FinalAnswer => "final_answer",
        }
    }
}

/// Mutable context threaded through the step functions of one run.
pub(crate) struct StepState {
    pub session: Session,
    /// Running conversation sent to the model (the session's message trail
    /// is the user-facing view; this is the model-facing one).
    pub conversation: Vec<ChatMessage>,
    /// Calls requested by the last reasoning step, not yet executed.
    pub pending_calls: Vec<ToolCall>,
    /// Text of the most recent model reply, used by the final-answer step.
    pub last_answer: String,
}

impl StepState {
    pub fn new(session: Session) -> Self {
        let conversation = vec![ChatMessage::human(session.user_question.clone())];
        Self {
            session,
            conversation,
            pending_calls: Vec::new(),
            last_answer: String::new(),
        }
    }

    /// Record a model reply: remember its text, extend the conversation, and
    /// stage any requested calls for the tool steps.
    pub fn absorb_reply(&mut self, reply: ModelReply) {
        self.last_answer = reply.text().to_string();
        match reply {
            ModelReply::Answer { text } => {
                self.conversation.push(ChatMessage::ai(text));
                self.pending_calls.clear();
            }
            ModelReply::ToolUse {
                text,
                requested_calls,
            } => {
                let content = if text.is_empty() { None } else { Some(text) };
                if requested_calls.is_empty() {
                    // An empty request list counts as no tool use.
                    self.conversation.push(ChatMessage::AI {
                        content,
                        tool_calls: None,
                    });
                    self.pending_calls.clear();
                } else {
                    self.conversation
                        .push(ChatMessage::ai_with_tools(content, requested_calls.clone()));
                    self.pending_calls = requested_calls;
                }
            }
        }
    }
}

/// Transition table. Reasoning branches on whether the last reply staged
/// tool calls; `FinalAnswer` is terminal.
pub(crate) fn route(current: Step, state: &StepState) -> Option<Step> {
    match current {
        Step::Thinking => Some(Step::Reasoning),
        Step::Reasoning => {
            if state.pending_calls.is_empty() {
                Some(Step::FinalAnswer)
            } else {
                Some(Step::ToolCalling)
            }
        }
        Step::ToolCalling => Some(Step::ToolExecution),
        Step::ToolExecution => Some(Step::Reasoning),
        Step::FinalAnswer => None,
    }
}

pub(crate) fn tool_call_metadata(call: &ToolCall) -> [(String, serde_json::Value); 3] {
    [
        ("tool_name".to_string(), json!(call.name)),
        ("tool_args".to_string(), call.arguments.clone()),
        ("tool_id".to_string(), json!(call.id)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_calls(calls: Vec<ToolCall>) -> StepState {
        let mut state = StepState::new(Session::new("q"));
        state.absorb_reply(ModelReply::tool_use("t", calls));
        state
    }

    #[test]
    fn routing_follows_the_transition_table() {
        let idle = StepState::new(Session::new("q"));
        assert_eq!(route(Step::Thinking, &idle), Some(Step::Reasoning));
        assert_eq!(route(Step::Reasoning, &idle), Some(Step::FinalAnswer));
        assert_eq!(route(Step::ToolCalling, &idle), Some(Step::ToolExecution));
        assert_eq!(route(Step::ToolExecution, &idle), Some(Step::Reasoning));
        assert_eq!(route(Step::FinalAnswer, &idle), None);
    }

    #[test]
    fn reasoning_branches_on_pending_calls() {
        let busy = state_with_calls(vec![ToolCall::new("add_numbers", json!({"a": 1, "b": 2}))]);
        assert_eq!(route(Step::Reasoning, &busy), Some(Step::ToolCalling));

        // An empty requested-call list means no tool use.
        let empty = state_with_calls(vec![]);
        assert_eq!(route(Step::Reasoning, &empty), Some(Step::FinalAnswer));
    }

    #[test]
    fn absorb_reply_stages_calls_and_extends_conversation() {
        let mut state = StepState::new(Session::new("q"));
        assert_eq!(state.conversation.len(), 1);

        state.absorb_reply(ModelReply::tool_use(
            "using a tool",
            vec![ToolCall::new("add_numbers", json!({"a": 1, "b": 2}))],
        ));
        assert_eq!(state.pending_calls.len(), 1);
        assert_eq!(state.last_answer, "using a tool");
        assert_eq!(state.conversation.len(), 2);

        state.absorb_reply(ModelReply::answer("3"));
        assert!(state.pending_calls.is_empty());
        assert_eq!(state.last_answer, "3");
    }
}
