use anyhow::Result;
use cascade_agent::Agent;
use cascade_llm::{ModelReply, ScriptedClient, ToolCall};
use cascade_store::{FileStore, SessionStore};
use cascade_tools::ToolRegistry;
use cascade_types::AgentConfig;
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("Cascade Agent - Simple Demo");
    println!("===========================\n");

    // 1. Storage in a throwaway directory
    println!("1. Setting up flat-file storage...");
    let dir = tempfile::tempdir()?;
    let store = SessionStore::new(FileStore::new(dir.path())?);
    println!("   ✓ Storage at {}\n", dir.path().display());

    // 2. A scripted model so the demo runs offline. Swap in
    //    OpenAIChatClient::new(api_key)? for a real model.
    println!("2. Building the agent...");
    let client = ScriptedClient::new(vec![
        // Question 1: addition via tool
        ModelReply::tool_use(
            "I'll add the two numbers.",
            vec![ToolCall::new("add_numbers", json!({"a": 25, "b": 37}))],
        ),
        ModelReply::answer("25 + 37 = 62"),
        // Question 2: division by zero, tool fails, model recovers
        ModelReply::tool_use(
            "Dividing the numbers.",
            vec![ToolCall::new("divide_numbers", json!({"a": 100, "b": 0}))],
        ),
        ModelReply::answer("100 / 0 is undefined: you cannot divide by zero."),
        // Question 3: multiplication via tool
        ModelReply::tool_use(
            "I'll multiply the two numbers.",
            vec![ToolCall::new("multiply_numbers", json!({"a": 15, "b": 6}))],
        ),
        ModelReply::answer("15 * 6 = 90"),
    ]);

    let agent = Agent::new(
        Arc::new(client),
        Arc::new(ToolRegistry::with_math_tools()),
        store.clone(),
        AgentConfig::default().with_step_delay(Duration::from_millis(50)),
    );
    println!("   ✓ Agent ready\n");

    // 3. Stream each question, one message per line
    let questions = [
        "What is 25 + 37?",
        "What is 100 / 0?",
        "What is 15 * 6?",
    ];

    for (i, question) in questions.iter().enumerate() {
        println!("3.{} Question: {}", i + 1, question);
        let mut run = agent.run(*question)?;
        while let Some(message) = run.next().await {
            println!("   [{}] {}", message.kind.as_str(), message.content);
        }
        println!();
    }

    // 4. Everything above is already on disk
    println!("4. Sessions on disk:");
    for session_id in store.file_store().list_sessions()? {
        let session = store
            .file_store()
            .get_session(&session_id)?
            .expect("session just listed");
        println!(
            "   {} [{}] {} ({} messages)",
            session.session_id,
            session.status.as_str(),
            session.user_question,
            session.message_count()
        );
    }

    Ok(())
}
