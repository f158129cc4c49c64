use crate::error::Result;
use crate::file_store::FileStore;
use cascade_types::{Message, Session, SessionStatus};
use std::sync::Arc;

/// Convenience layer over [`FileStore`] for code that holds a live session:
/// keeps the in-memory session and the on-disk records in step.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<FileStore>,
}

impl SessionStore {
    pub fn new(store: FileStore) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub fn file_store(&self) -> &FileStore {
        &self.inner
    }

    /// Construct and persist a new session for a question.
    pub fn create_session(&self, user_question: impl Into<String>) -> Result<Session> {
        let session = Session::new(user_question);
        self.inner.save_session(&session)?;
        Ok(session)
    }

    /// Append a message to the in-memory session, persist the message, and
    /// re-persist the session so `updated_at` advances on disk.
    pub fn add_message(&self, session: &mut Session, message: Message) -> Result<()> {
        self.inner.save_message(&message, &session.session_id)?;
        session.add_message(message);
        self.inner.save_session(session)
    }

    /// Transition the session status and persist it.
    pub fn mark_status(&self, session: &mut Session, status: SessionStatus) -> Result<()> {
        session.set_status(status);
        self.inner.save_session(session)
    }
}
