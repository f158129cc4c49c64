use cascade_agent::Agent;
use cascade_llm::{ModelReply, ScriptedClient, ToolCall};
use cascade_store::{FileStore, SessionStore};
use cascade_tools::ToolRegistry;
use cascade_types::{AgentConfig, Message, MessageKind, SessionStatus};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn agent_with(replies: Vec<ModelReply>, dir: &TempDir) -> Agent {
    let store = SessionStore::new(FileStore::new(dir.path()).unwrap());
    Agent::new(
        Arc::new(ScriptedClient::new(replies)),
        Arc::new(ToolRegistry::with_math_tools()),
        store,
        AgentConfig::default(),
    )
}

fn kinds(messages: &[Message]) -> Vec<MessageKind> {
    messages.iter().map(|m| m.kind).collect()
}

/// The kind sequence must start with THINKING and contain exactly one
/// FINAL_ANSWER iff the session completed; otherwise it ends with ERROR.
fn assert_valid_path(kinds: &[MessageKind], status: SessionStatus) {
    assert_eq!(kinds.first(), Some(&MessageKind::Thinking));
    let finals = kinds
        .iter()
        .filter(|k| **k == MessageKind::FinalAnswer)
        .count();
    match status {
        SessionStatus::Completed => {
            assert_eq!(finals, 1);
            assert_eq!(kinds.last(), Some(&MessageKind::FinalAnswer));
        }
        SessionStatus::Error => {
            assert_eq!(finals, 0);
            assert_eq!(kinds.last(), Some(&MessageKind::Error));
        }
        SessionStatus::Active => panic!("session never reached a terminal status"),
    }
}

#[tokio::test]
async fn add_question_runs_tool_and_completes() {
    let dir = TempDir::new().unwrap();
    let agent = agent_with(
        vec![
            ModelReply::tool_use(
                "I'll add the two numbers.",
                vec![ToolCall::new("add_numbers", json!({"a": 25, "b": 37}))],
            ),
            ModelReply::answer("25 + 37 = 62"),
        ],
        &dir,
    );

    let mut run = agent.run("What is 25 + 37?").unwrap();
    let session_id = run.session_id().to_string();

    let mut messages = Vec::new();
    while let Some(message) = run.next().await {
        messages.push(message);
    }

    assert_eq!(
        kinds(&messages),
        [
            MessageKind::Thinking,
            MessageKind::Reasoning,
            MessageKind::ToolCall,
            MessageKind::ToolResult,
            MessageKind::Reasoning,
            MessageKind::FinalAnswer,
        ]
    );

    let tool_call = &messages[2];
    assert_eq!(tool_call.metadata_str("tool_name"), "add_numbers");
    assert_eq!(tool_call.metadata["tool_args"], json!({"a": 25, "b": 37}));

    let tool_result = &messages[3];
    assert_eq!(tool_result.content, "62");
    assert_eq!(tool_result.metadata["success"], json!(true));

    let final_answer = messages.last().unwrap();
    assert!(final_answer.content.contains("62"));

    // The finished session is read back from the store; nothing re-runs.
    let session = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.message_count(), 6);
    assert_valid_path(&kinds(&session.messages), session.status);
}

#[tokio::test]
async fn division_by_zero_is_surfaced_to_the_model_not_fatal() {
    let dir = TempDir::new().unwrap();
    let agent = agent_with(
        vec![
            ModelReply::tool_use(
                "Dividing the numbers.",
                vec![ToolCall::new(
                    "divide_numbers",
                    json!({"a": 100, "b": 0}),
                )],
            ),
            ModelReply::answer("100 / 0 is undefined: you cannot divide by zero."),
        ],
        &dir,
    );

    let mut run = agent.run("What is 100 / 0?").unwrap();
    let session_id = run.session_id().to_string();

    let mut messages = Vec::new();
    while let Some(message) = run.next().await {
        messages.push(message);
    }

    let tool_result = messages
        .iter()
        .find(|m| m.kind == MessageKind::ToolResult)
        .unwrap();
    assert_eq!(tool_result.metadata["success"], json!(false));
    assert!(tool_result.content.contains("divide by zero"));

    let final_answer = messages.last().unwrap();
    assert_eq!(final_answer.kind, MessageKind::FinalAnswer);
    assert!(final_answer.content.contains("divide by zero"));

    let session = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_valid_path(&kinds(&session.messages), session.status);
}

#[tokio::test]
async fn model_failure_emits_error_and_marks_session() {
    let dir = TempDir::new().unwrap();
    // Empty script: the first reasoning step fails.
    let agent = agent_with(vec![], &dir);

    let mut run = agent.run("anything").unwrap();
    let session_id = run.session_id().to_string();

    let mut messages = Vec::new();
    while let Some(message) = run.next().await {
        messages.push(message);
    }

    assert_eq!(
        kinds(&messages),
        [MessageKind::Thinking, MessageKind::Error]
    );
    let error = messages.last().unwrap();
    assert_eq!(error.metadata_str("error_type"), "model_error");
    assert!(error.content.contains("Processing failed"));

    let session = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Error);
    assert_valid_path(&kinds(&session.messages), session.status);

    // Stream is finite: no elements after the terminal error.
    assert!(run.next().await.is_none());
}

#[tokio::test]
async fn iteration_guardrail_ends_looping_sessions() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(FileStore::new(dir.path()).unwrap());
    let client = ScriptedClient::new(vec![ModelReply::tool_use(
        "looping",
        vec![ToolCall::new("add_numbers", json!({"a": 1, "b": 1}))],
    )]);
    let agent = Agent::new(
        Arc::new(client),
        Arc::new(ToolRegistry::with_math_tools()),
        store,
        AgentConfig::default().with_max_iterations(4),
    );

    let mut run = agent.run("loop forever").unwrap();
    let session_id = run.session_id().to_string();

    let mut messages = Vec::new();
    while let Some(message) = run.next().await {
        messages.push(message);
    }

    assert_eq!(
        kinds(&messages),
        [
            MessageKind::Thinking,
            MessageKind::Reasoning,
            MessageKind::ToolCall,
            MessageKind::ToolResult,
            MessageKind::Error,
        ]
    );
    let error = messages.last().unwrap();
    assert_eq!(error.metadata_str("error_type"), "max_iterations");

    let session = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Error);
}

#[tokio::test]
async fn messages_are_persisted_as_they_are_yielded() {
    let dir = TempDir::new().unwrap();
    let agent = agent_with(vec![ModelReply::answer("just text")], &dir);

    let mut run = agent.run("no tools needed").unwrap();
    let session_id = run.session_id().to_string();

    // After pulling only the first element, exactly one message is on disk
    // and the session is still active: consumption is pull-driven.
    let first = run.next().await.unwrap();
    assert_eq!(first.kind, MessageKind::Thinking);

    let partial = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(partial.message_count(), 1);
    assert_eq!(partial.status, SessionStatus::Active);

    while run.next().await.is_some() {}

    let finished = agent
        .store()
        .file_store()
        .get_session(&session_id)
        .unwrap()
        .unwrap();
    assert_eq!(finished.status, SessionStatus::Completed);
    assert_eq!(finished.message_count(), 3);
}
