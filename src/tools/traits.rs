//! Tool trait definition and the schema record every tool advertises.

use crate::error::{short_type_name, ToolError};
use crate::types::{Arguments, ToolOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of a function exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Discriminator of a [`ToolSchema`]. Only function tools exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    Function,
}

/// Schema record in the OpenAI-compatible shape:
///
/// ```json
/// {
///   "type": "function",
///   "function": {
///     "name": "add",
///     "description": "Adds two numbers.",
///     "parameters": {"type": "object", "properties": {...}, "required": [...]}
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    pub function: ToolDefinition,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: SchemaKind::Function,
            function: ToolDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn description(&self) -> &str {
        &self.function.description
    }

    pub fn parameters(&self) -> &Value {
        &self.function.parameters
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.function.parameters["properties"]
            .as_object()
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names listed under `parameters.required`.
    pub fn required(&self) -> Vec<&str> {
        self.function.parameters["required"]
            .as_array()
            .map(|req| req.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("ToolSchema always serializes")
    }
}

/// Which execution strategies a tool really implements.
///
/// Declared by the tool author; dispatch never guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Neither `forward` nor `async_forward` is implemented.
    Unimplemented,
    /// `forward` is implemented.
    Synchronous,
    /// `async_forward` is implemented.
    Asynchronous,
    /// Both are implemented.
    Both,
}

impl Capability {
    pub fn is_sync(self) -> bool {
        matches!(self, Self::Synchronous | Self::Both)
    }

    pub fn is_async(self) -> bool {
        matches!(self, Self::Asynchronous | Self::Both)
    }

    /// Whether `async_forward` can produce a result, either natively or by
    /// delegating to `forward`.
    pub fn has_async_path(self) -> bool {
        self != Self::Unimplemented
    }
}

/// A tool callable by an agent.
///
/// Implement `forward` for blocking tools, `async_forward` for tools that
/// wait on I/O, and report which ones exist through
/// [`capability`](Tool::capability). Tools built from plain functions use
/// [`FunctionTool`](crate::tools::FunctionTool) instead.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in function calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Full schema record. Tools must return `Some`, otherwise
    /// [`ToolHandle::new`](crate::tools::ToolHandle::new) rejects them.
    fn schema(&self) -> Option<ToolSchema> {
        None
    }

    /// Strategies this tool implements.
    fn capability(&self) -> Capability;

    /// Synchronous execution.
    fn forward(&self, _args: Arguments) -> Result<ToolOutput, ToolError> {
        Err(ToolError::Unimplemented {
            tool: self.type_name().to_string(),
        })
    }

    /// Asynchronous execution. Delegates to [`forward`](Tool::forward)
    /// unless overridden.
    async fn async_forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        self.forward(args)
    }

    /// Concrete type name used in error messages.
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}
