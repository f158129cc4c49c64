use crate::config::Config;
use crate::facade::StreamingApi;
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: StreamingApi,
}

impl AppState {
    pub fn new(config: Config, api: StreamingApi) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }
}
