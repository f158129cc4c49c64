use crate::steps::{route, tool_call_metadata, Step, StepState, SYSTEM_PROMPT};
use anyhow::Result;
use async_stream::stream;
use cascade_llm::{ChatClient, ChatMessage, ChatOptions, ChatRequest};
use cascade_store::{SessionStore, StoreError};
use cascade_tools::ToolExecutor;
use cascade_types::{AgentConfig, Message, MessageKind, SessionStatus};
use futures::Stream;
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Runs the reasoning state machine for one question at a time.
///
/// Cheap to clone: all parts are shared handles.
#[derive(Clone)]
pub struct Agent {
    client: Arc<dyn ChatClient>,
    tools: Arc<dyn ToolExecutor>,
    store: SessionStore,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: Arc<dyn ToolExecutor>,
        store: SessionStore,
        config: AgentConfig,
    ) -> Self {
        Self {
            client,
            tools,
            store,
            config,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Start processing a question.
    ///
    /// Returns a finite, single-pass, pull-driven stream of the session's
    /// messages: each state transition executes only when the caller polls
    /// for the next element. Every yielded message is already persisted. On
    /// an unrecoverable failure the last element is an ERROR message, the
    /// session status becomes `error`, and the stream ends. The finished
    /// session can be read back from the store via
    /// [`SessionStream::session_id`] without re-running anything.
    pub fn run(&self, question: impl Into<String>) -> Result<SessionStream> {
        let session = self.store.create_session(question)?;
        let session_id = session.session_id.clone();
        tracing::info!(session_id = %session_id, "session created");

        let agent = self.clone();
        let inner = Box::pin(stream! {
            let mut state = StepState::new(session);
            let mut current = Step::Thinking;
            let mut iterations = 0usize;

            loop {
                // Guardrail against unbounded tool-call loops.
                if iterations >= agent.config.max_iterations {
                    let message = Message::new(
                        MessageKind::Error,
                        format!(
                            "Processing stopped: max iterations ({}) reached",
                            agent.config.max_iterations
                        ),
                    )
                    .with_metadata("error_type", json!("max_iterations"));
                    yield agent.fail(&mut state, message);
                    break;
                }

                match agent.execute_step(current, &mut state).await {
                    Ok(messages) => {
                        for message in messages {
                            yield message;
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            session_id = %state.session.session_id,
                            step = current.as_str(),
                            error = %e,
                            "step failed"
                        );
                        let message = Message::new(
                            MessageKind::Error,
                            format!("Processing failed: {e:#}"),
                        )
                        .with_metadata("error_type", json!(error_kind(&e)));
                        yield agent.fail(&mut state, message);
                        break;
                    }
                }

                if let Some(delay) = agent.config.step_delay {
                    tokio::time::sleep(delay).await;
                }

                match route(current, &state) {
                    Some(next) => current = next,
                    None => break,
                }
                iterations += 1;
            }
        });

        Ok(SessionStream { session_id, inner })
    }

    async fn execute_step(&self, step: Step, state: &mut StepState) -> Result<Vec<Message>> {
        match step {
            Step::Thinking => self.thinking_step(state),
            Step::Reasoning => self.reasoning_step(state).await,
            Step::ToolCalling => self.tool_calling_step(state),
            Step::ToolExecution => self.tool_execution_step(state).await,
            Step::FinalAnswer => self.final_answer_step(state),
        }
    }

    fn thinking_step(&self, state: &mut StepState) -> Result<Vec<Message>> {
        let message = Message::new(MessageKind::Thinking, "Let me analyze your question...")
            .with_metadata("step", json!("initial_thinking"));
        self.store.add_message(&mut state.session, message.clone())?;
        Ok(vec![message])
    }

    async fn reasoning_step(&self, state: &mut StepState) -> Result<Vec<Message>> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        messages.extend(state.conversation.iter().cloned());

        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_options(ChatOptions::new().tools(self.tools.specs()));
        let reply = self.client.complete(request).await?;

        let message = Message::new(MessageKind::Reasoning, reply.text())
            .with_metadata("step", json!("reasoning"))
            .with_metadata("has_tool_calls", json!(reply.has_tool_calls()));
        self.store.add_message(&mut state.session, message.clone())?;

        state.absorb_reply(reply);
        Ok(vec![message])
    }

    /// Announce each requested call. Nothing is executed yet.
    fn tool_calling_step(&self, state: &mut StepState) -> Result<Vec<Message>> {
        let mut emitted = Vec::new();
        for call in state.pending_calls.clone() {
            let mut message = Message::new(
                MessageKind::ToolCall,
                format!("Preparing to call tool: {}", call.name),
            );
            for (key, value) in tool_call_metadata(&call) {
                message.metadata.insert(key, value);
            }
            self.store.add_message(&mut state.session, message.clone())?;
            emitted.push(message);
        }
        Ok(emitted)
    }

    /// Execute each staged call. A failing tool is not fatal: the failure
    /// text goes back to the model as a tool result and reasoning continues.
    async fn tool_execution_step(&self, state: &mut StepState) -> Result<Vec<Message>> {
        let calls = std::mem::take(&mut state.pending_calls);
        let mut emitted = Vec::new();

        for call in calls {
            let (content, error) = match self.tools.execute(&call.name, &call.arguments).await {
                Ok(result) => (result, None),
                Err(e) => (format!("Tool execution failed: {e}"), Some(e.to_string())),
            };

            let mut message = Message::new(MessageKind::ToolResult, content.clone())
                .with_metadata("call_id", json!(call.id))
                .with_metadata("success", json!(error.is_none()));
            if let Some(err) = error {
                message.metadata.insert("error".to_string(), json!(err));
            }
            self.store.add_message(&mut state.session, message.clone())?;

            state
                .conversation
                .push(ChatMessage::tool_result(call.id, content));
            emitted.push(message);
        }

        Ok(emitted)
    }

    fn final_answer_step(&self, state: &mut StepState) -> Result<Vec<Message>> {
        let message = Message::new(MessageKind::FinalAnswer, state.last_answer.clone())
            .with_metadata("step", json!("completed"));
        self.store.add_message(&mut state.session, message.clone())?;
        self.store
            .mark_status(&mut state.session, SessionStatus::Completed)?;
        Ok(vec![message])
    }

    /// Best-effort persistence of the terminal error; already-persisted
    /// messages stay intact for later inspection.
    fn fail(&self, state: &mut StepState, message: Message) -> Message {
        if let Err(e) = self.store.add_message(&mut state.session, message.clone()) {
            tracing::error!(error = %e, "failed to persist error message");
        }
        if let Err(e) = self
            .store
            .mark_status(&mut state.session, SessionStatus::Error)
        {
            tracing::error!(error = %e, "failed to persist error status");
        }
        message
    }
}

fn error_kind(e: &anyhow::Error) -> &'static str {
    if e.downcast_ref::<StoreError>().is_some() {
        "storage_error"
    } else {
        "model_error"
    }
}

/// The message stream of one session run.
pub struct SessionStream {
    session_id: String,
    inner: Pin<Box<dyn Stream<Item = Message> + Send>>,
}

impl SessionStream {
    /// Identifier of the session this run is writing to, available before
    /// the first element is polled.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Stream for SessionStream {
    type Item = Message;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
