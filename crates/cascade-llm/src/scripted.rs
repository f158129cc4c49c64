use crate::reply::ModelReply;
use crate::traits::{ChatClient, ChatRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic chat client for demos and tests.
///
/// Hands out pre-programmed replies in order; running past the script is an
/// error, which surfaces through the pipeline's normal fatal-error path.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<ModelReply>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    /// Append another reply to the script.
    pub fn push(&self, reply: ModelReply) {
        self.replies
            .lock()
            .expect("scripted replies lock poisoned")
            .push_back(reply);
    }

    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .expect("scripted replies lock poisoned")
            .len()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, _request: ChatRequest) -> Result<ModelReply> {
        let next = self
            .replies
            .lock()
            .expect("scripted replies lock poisoned")
            .pop_front();

        next.ok_or_else(|| anyhow::anyhow!("Scripted replies exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;

    #[tokio::test]
    async fn hands_out_replies_in_order_then_errors() {
        let client = ScriptedClient::new(vec![
            ModelReply::tool_use(
                "Adding the numbers.",
                vec![ToolCall::new(
                    "add_numbers",
                    serde_json::json!({"a": 1, "b": 2}),
                )],
            ),
            ModelReply::answer("The sum is 3."),
        ]);

        let request = ChatRequest::new("test-model", vec![]);

        let first = client.complete(request.clone()).await.unwrap();
        assert!(first.has_tool_calls());

        let second = client.complete(request.clone()).await.unwrap();
        assert_eq!(second.text(), "The sum is 3.");

        assert!(client.complete(request).await.is_err());
    }
}
