pub mod config;
pub mod error;
pub mod facade;
pub mod handlers;
pub mod responses;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use facade::StreamingApi;
pub use responses::{SessionHistory, SessionList, StreamFrame};
