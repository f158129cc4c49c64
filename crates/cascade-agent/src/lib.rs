pub mod driver;
pub mod steps;

pub use driver::{Agent, SessionStream};
pub use steps::SYSTEM_PROMPT;
