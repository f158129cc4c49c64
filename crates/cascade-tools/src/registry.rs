use anyhow::Result;
use async_trait::async_trait;
use cascade_llm::ToolSpec;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Trait for executing named tools on the model's behalf.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, name: &str, arguments: &Value) -> Result<String>;

    /// Tool definitions to advertise to the model.
    fn specs(&self) -> Vec<ToolSpec>;
}

type Handler = Box<dyn Fn(&Value) -> Result<String> + Send + Sync>;

struct RegisteredTool {
    spec: ToolSpec,
    handler: Handler,
}

/// In-process tool registry.
///
/// Tools are synchronous functions over a JSON arguments object; a failing
/// tool returns an error the caller is expected to surface to the model as a
/// tool result, not to treat as fatal.
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry pre-loaded with the arithmetic tools.
    pub fn with_math_tools() -> Self {
        let mut registry = Self::new();

        registry.register(
            ToolSpec::new(
                "add_numbers",
                "Add two numbers together.",
                binary_int_schema(),
            ),
            |args| {
                let BinaryIntArgs { a, b } = parse_args(args)?;
                Ok((a + b).to_string())
            },
        );

        registry.register(
            ToolSpec::new(
                "multiply_numbers",
                "Multiply two numbers together.",
                binary_int_schema(),
            ),
            |args| {
                let BinaryIntArgs { a, b } = parse_args(args)?;
                Ok((a * b).to_string())
            },
        );

        registry.register(
            ToolSpec::new(
                "divide_numbers",
                "Divide two numbers. Returns error if division by zero.",
                binary_number_schema(),
            ),
            |args| {
                let BinaryFloatArgs { a, b } = parse_args(args)?;
                if b == 0.0 {
                    anyhow::bail!("Cannot divide by zero!");
                }
                Ok((a / b).to_string())
            },
        );

        registry
    }

    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: impl Fn(&Value) -> Result<String> + Send + Sync + 'static,
    ) {
        let name = spec.name.clone();
        self.tools.insert(
            name.clone(),
            RegisteredTool {
                spec,
                handler: Box::new(handler),
            },
        );
        self.order.push(name);
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, name: &str, arguments: &Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", name))?;

        tracing::debug!(tool = name, args = %arguments, "executing tool");
        (tool.handler)(arguments)
    }

    fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.spec.clone())
            .collect()
    }
}

#[derive(Deserialize)]
struct BinaryIntArgs {
    a: i64,
    b: i64,
}

#[derive(Deserialize)]
struct BinaryFloatArgs {
    a: f64,
    b: f64,
}

fn parse_args<T: serde::de::DeserializeOwned>(args: &Value) -> Result<T> {
    serde_json::from_value(args.clone())
        .map_err(|e| anyhow::anyhow!("Invalid tool arguments: {}", e))
}

fn binary_int_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "a": { "type": "integer" },
            "b": { "type": "integer" },
        },
        "required": ["a", "b"],
    })
}

fn binary_number_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "a": { "type": "number" },
            "b": { "type": "number" },
        },
        "required": ["a", "b"],
    })
}
