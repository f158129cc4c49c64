use crate::error::{Result, StoreError};
use cascade_types::{Message, MessageKind, Metadata, Session, SessionStatus};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const FIELD_SEP: char = '|';

/// Flat-file store backed by two pipe-delimited text files.
///
/// `sessions.txt` holds one session record per line, upserted by full-file
/// rewrite; `messages.txt` is append-only. Lines starting with `#` are
/// headers. There is no locking: concurrent writers can race on the session
/// rewrite, and no crash-consistency guarantee is made.
pub struct FileStore {
    sessions_path: PathBuf,
    messages_path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let store = Self {
            sessions_path: dir.join("sessions.txt"),
            messages_path: dir.join("messages.txt"),
        };
        store.init_files()?;
        Ok(store)
    }

    fn init_files(&self) -> Result<()> {
        if !self.sessions_path.exists() {
            fs::write(
                &self.sessions_path,
                "# Sessions Table\n# session_id|user_question|status|created_at|updated_at\n\n",
            )?;
        }
        if !self.messages_path.exists() {
            fs::write(
                &self.messages_path,
                "# Messages Table\n# message_id|session_id|kind|content|metadata_json|timestamp\n\n",
            )?;
        }
        Ok(())
    }

    /// Upsert a session record: replace the matching line in place, or
    /// append. Rewrites the whole file.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let mut lines: Vec<String> = if self.sessions_path.exists() {
            fs::read_to_string(&self.sessions_path)?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let rendered = render_session_line(session);
        let prefix = format!("{}{}", session.session_id, FIELD_SEP);

        if let Some(existing) = lines.iter_mut().find(|l| l.starts_with(&prefix)) {
            *existing = rendered;
        } else {
            lines.push(rendered);
        }

        let mut out = lines.join("\n");
        out.push('\n');
        fs::write(&self.sessions_path, out)?;
        Ok(())
    }

    /// Append one message record.
    pub fn save_message(&self, message: &Message, session_id: &str) -> Result<()> {
        // The metadata column must stay free of the field delimiter or the
        // right-hand split on read would land inside it. A pipe can only
        // occur inside a JSON string literal, so the unicode escape keeps
        // the column valid JSON and round-trips through `from_str`.
        let metadata_json = serde_json::to_string(&message.metadata)
            .unwrap_or_else(|_| "{}".to_string())
            .replace(FIELD_SEP, "\\u007c");
        let line = format!(
            "{}|{}|{}|{}|{}|{}\n",
            message.id,
            session_id,
            message.kind.as_str(),
            sanitize(&message.content),
            metadata_json,
            message.timestamp.to_rfc3339(),
        );

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.messages_path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Look up one session, eagerly loading its message list sorted by
    /// timestamp. Unknown ids return `Ok(None)`.
    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        if !self.sessions_path.exists() {
            return Ok(None);
        }

        for line in fs::read_to_string(&self.sessions_path)?.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let Some(mut session) = parse_session_line(line) else {
                continue;
            };
            if session.session_id != session_id {
                continue;
            }

            session.messages = self.get_messages_by_session(session_id)?;
            return Ok(Some(session));
        }

        Ok(None)
    }

    /// All messages for a session, sorted by timestamp.
    pub fn get_messages_by_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        if !self.messages_path.exists() {
            return Ok(messages);
        }

        for line in fs::read_to_string(&self.messages_path)?.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some(message) = parse_message_line(line, session_id) {
                messages.push(message);
            }
        }

        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// All session ids in file order.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let mut session_ids = Vec::new();

        if !self.sessions_path.exists() {
            return Ok(session_ids);
        }

        for line in fs::read_to_string(&self.sessions_path)?.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some(id) = line.split(FIELD_SEP).next() {
                session_ids.push(id.to_string());
            }
        }

        Ok(session_ids)
    }

    /// Read-modify-write status update.
    pub fn update_session_status(&self, session_id: &str, status: SessionStatus) -> Result<()> {
        let mut session = self
            .get_session(session_id)?
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        session.set_status(status);
        self.save_session(&session)
    }
}

fn render_session_line(session: &Session) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        session.session_id,
        sanitize(&session.user_question),
        session.status.as_str(),
        session.created_at.to_rfc3339(),
        session.updated_at.to_rfc3339(),
    )
}

/// Parse one session line. The question field may legally contain the
/// delimiter: the id splits from the left, the three trailing fields split
/// from the right, and the middle is the question.
fn parse_session_line(line: &str) -> Option<Session> {
    let mut left = line.splitn(2, FIELD_SEP);
    let session_id = left.next()?;
    let rest = left.next()?;

    let mut right = rest.rsplitn(4, FIELD_SEP);
    let updated_str = right.next()?;
    let created_str = right.next()?;
    let status_str = right.next()?;
    let user_question = right.next().unwrap_or_default();

    let Some(status) = SessionStatus::parse(status_str) else {
        tracing::warn!(session_id, status = status_str, "skipping session with unknown status");
        return None;
    };
    let (Some(created_at), Some(updated_at)) =
        (parse_timestamp(created_str), parse_timestamp(updated_str))
    else {
        tracing::warn!(session_id, "skipping session with unparseable timestamps");
        return None;
    };

    Some(Session {
        session_id: session_id.to_string(),
        user_question: user_question.to_string(),
        messages: Vec::new(),
        status,
        created_at,
        updated_at,
    })
}

/// Parse one message line. The content field may legally contain the
/// delimiter, so the three leading fields split from the left and the two
/// trailing fields split from the right; whatever remains in the middle is
/// the content, delimiters intact.
fn parse_message_line(line: &str, session_id: &str) -> Option<Message> {
    let mut left = line.splitn(4, FIELD_SEP);
    let message_id = left.next()?;
    let line_session_id = left.next()?;
    let kind_str = left.next()?;
    let rest = left.next()?;

    if line_session_id != session_id {
        return None;
    }

    let mut right = rest.rsplitn(3, FIELD_SEP);
    let timestamp_str = right.next()?;
    let metadata_str = right.next()?;
    let content = right.next().unwrap_or_default();

    let Some(kind) = MessageKind::parse(kind_str) else {
        tracing::warn!(message_id, kind = kind_str, "skipping message with unknown kind");
        return None;
    };
    let Some(timestamp) = parse_timestamp(timestamp_str) else {
        tracing::warn!(message_id, "skipping message with unparseable timestamp");
        return None;
    };

    // Malformed metadata is lossy but non-fatal: fall back to an empty map.
    let metadata: Metadata = serde_json::from_str(metadata_str).unwrap_or_default();

    Some(Message {
        id: message_id.to_string(),
        kind,
        content: content.to_string(),
        metadata,
        timestamp,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Records are one per line; embedded line breaks would corrupt the file.
fn sanitize(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}
