use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one agent pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model name passed to the chat client.
    pub model: String,
    /// Guardrail on the state-machine loop; exceeding it ends the session
    /// with an error.
    pub max_iterations: usize,
    /// Optional artificial pause after each state transition, to simulate a
    /// live stream in demos.
    pub step_delay: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_iterations: 25,
            step_delay: None,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }
}
