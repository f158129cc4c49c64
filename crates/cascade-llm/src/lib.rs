pub mod openai;
pub mod reply;
pub mod scripted;
pub mod traits;
pub mod types;

pub use openai::OpenAIChatClient;
pub use reply::ModelReply;
pub use scripted::ScriptedClient;
pub use traits::{ChatClient, ChatOptions, ChatRequest};
pub use types::{ChatMessage, ToolCall, ToolSpec};
