use crate::error::{ApiError, ApiResult};
use crate::responses::{SessionHistory, SessionList, SessionSummary, StreamFrame};
use cascade_agent::Agent;
use cascade_store::StoreError;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// JSON-line facade over the agent: every consumer-facing shape is a
/// serialized [`StreamFrame`], [`SessionHistory`], or [`SessionList`].
#[derive(Clone)]
pub struct StreamingApi {
    agent: Agent,
}

impl StreamingApi {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Process a question as a stream of JSON lines, one frame per line.
    ///
    /// If the session cannot even be created, the stream holds a single
    /// error frame. Otherwise frames are produced lazily as the underlying
    /// session stream is polled, terminal errors included.
    pub fn ask_question_stream(
        &self,
        question: impl Into<String>,
    ) -> Pin<Box<dyn Stream<Item = String> + Send>> {
        match self.agent.run(question) {
            Ok(run) => {
                Box::pin(run.map(|message| StreamFrame::from_message(&message).to_json_line()))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start session");
                let frame = StreamFrame::error(format!("{e:#}"), run_error_kind(&e));
                Box::pin(futures::stream::once(async move { frame.to_json_line() }))
            }
        }
    }

    /// Process a question to completion and return the grouped history.
    ///
    /// Drains the session stream, then reads the finished session back from
    /// the store by id. The run itself is never repeated.
    pub async fn ask_question(&self, question: impl Into<String>) -> ApiResult<SessionHistory> {
        let mut run = self.agent.run(question)?;
        let session_id = run.session_id().to_string();

        while run.next().await.is_some() {}

        self.get_session_history(&session_id)?
            .ok_or(ApiError::SessionNotFound(session_id))
    }

    /// Grouped history of one session, or `None` for an unknown id.
    pub fn get_session_history(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionHistory>, StoreError> {
        let session = self.agent.store().file_store().get_session(session_id)?;
        Ok(session.as_ref().map(SessionHistory::from_session))
    }

    /// Summaries of every known session, in creation order.
    pub fn list_sessions(&self) -> Result<SessionList, StoreError> {
        let store = self.agent.store().file_store();
        let mut sessions = Vec::new();

        for session_id in store.list_sessions()? {
            // A session can disappear between listing and loading; skip it.
            if let Some(session) = store.get_session(&session_id)? {
                sessions.push(SessionSummary::from_session(&session));
            }
        }

        Ok(SessionList {
            total_sessions: sessions.len(),
            sessions,
        })
    }
}

fn run_error_kind(e: &anyhow::Error) -> &'static str {
    if e.downcast_ref::<StoreError>().is_some() {
        "storage_error"
    } else {
        "agent_error"
    }
}
