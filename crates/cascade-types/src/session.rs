use crate::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a session. Starts `Active` and transitions once to a
/// terminal state, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// One end-to-end processing of a single user question: the original
/// question, the ordered message trail, and a lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_question: String,
    pub messages: Vec<Message>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_question: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_question: user_question.into(),
            messages: Vec::new(),
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message. Messages are append-only; order is chronological.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Transition the status. A terminal status is write-once: later calls
    /// are ignored.
    pub fn set_status(&mut self, status: SessionStatus) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    #[test]
    fn new_session_is_active() {
        let session = Session::new("What is 2 + 2?");
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.user_question, "What is 2 + 2?");
        assert!(session.messages.is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn add_message_preserves_order_and_advances_updated_at() {
        let mut session = Session::new("question");
        let before = session.updated_at;

        session.add_message(Message::new(MessageKind::Thinking, "first"));
        session.add_message(Message::new(MessageKind::Reasoning, "second"));

        assert_eq!(session.messages[0].content, "first");
        assert_eq!(session.messages[1].content, "second");
        assert!(session.updated_at >= before);
        assert!(session.messages[0].timestamp <= session.messages[1].timestamp);
    }

    #[test]
    fn terminal_status_is_write_once() {
        let mut session = Session::new("question");
        session.set_status(SessionStatus::Completed);
        assert_eq!(session.status, SessionStatus::Completed);

        session.set_status(SessionStatus::Error);
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn status_parse_round_trip() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Completed,
            SessionStatus::Error,
        ] {
            assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SessionStatus::parse("done"), None);
    }
}
