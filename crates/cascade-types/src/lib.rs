pub mod config;
pub mod message;
pub mod session;

pub use config::AgentConfig;
pub use message::{Message, MessageKind, Metadata};
pub use session::{Session, SessionStatus};
