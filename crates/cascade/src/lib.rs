//! # Cascade - Streaming ReAct Agent Framework
//!
//! Cascade runs a question through an explicit reasoning state machine
//! (thinking, reasoning, tool calling, tool execution, final answer) and
//! exposes the run as a finite, pull-driven stream of persisted messages.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cascade::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpenAIChatClient::new(std::env::var("OPENAI_API_KEY")?)?;
//!     let store = SessionStore::new(FileStore::new("agent_storage")?);
//!
//!     let agent = Agent::new(
//!         Arc::new(client),
//!         Arc::new(ToolRegistry::with_math_tools()),
//!         store,
//!         AgentConfig::default(),
//!     );
//!
//!     let mut run = agent.run("What is 25 + 37?")?;
//!     while let Some(message) = run.next().await {
//!         println!("[{}] {}", message.kind.as_str(), message.content);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Cascade consists of several composable crates:
//!
//! - **cascade-types**: Core types (Message, Session, AgentConfig)
//! - **cascade-llm**: Chat clients (OpenAI-compatible, plus a scripted test double)
//! - **cascade-tools**: Tool trait and the built-in math registry
//! - **cascade-store**: Flat-file session and message persistence
//! - **cascade-agent**: The state machine driver and session stream

pub use cascade_agent as agent;
pub use cascade_llm as llm;
pub use cascade_store as store;
pub use cascade_tools as tools;
pub use cascade_types as types;

pub use cascade_agent::{Agent, SessionStream};
pub use cascade_llm::{ChatClient, ModelReply, OpenAIChatClient, ScriptedClient};
pub use cascade_store::{FileStore, SessionStore};
pub use cascade_tools::{ToolExecutor, ToolRegistry};
pub use cascade_types::{AgentConfig, Message, MessageKind, Session, SessionStatus};

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::agent::{Agent, SessionStream};
    pub use crate::llm::{ChatClient, ModelReply, OpenAIChatClient, ScriptedClient, ToolCall};
    pub use crate::store::{FileStore, SessionStore};
    pub use crate::tools::{ToolExecutor, ToolRegistry};
    pub use crate::types::{AgentConfig, Message, MessageKind, Session, SessionStatus};
    pub use anyhow::Result;
    pub use futures::StreamExt;
}
