pub mod registry;

pub use registry::{ToolExecutor, ToolRegistry};
