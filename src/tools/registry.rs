//! Name-keyed tool registry for routing model tool calls.

use crate::error::ToolError;
use crate::tools::traits::ToolSchema;
use crate::tools::{Dispatch, ToolHandle};
use crate::types::{Arguments, ToolCall, ToolOutput};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Registry of tools in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolHandle>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A tool with the same name is replaced in place and
    /// returned.
    pub fn register(&mut self, tool: ToolHandle) -> Option<ToolHandle> {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registering tool");
        match self.by_name.get(&name) {
            Some(&idx) => Some(std::mem::replace(&mut self.tools[idx], tool)),
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
                None
            }
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: ToolHandle) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolHandle> {
        self.by_name.get(name).map(|&idx| &self.tools[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolHandle::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolHandle> {
        self.tools.iter()
    }

    /// Schemas of every tool, ready to hand to the inference model.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema().clone()).collect()
    }

    /// A registry with only the named tools. Unknown names are ignored.
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> ToolRegistry {
        let allowed: HashSet<&str> = names.into_iter().collect();
        self.tools
            .iter()
            .filter(|t| allowed.contains(t.name()))
            .cloned()
            .fold(ToolRegistry::new(), ToolRegistry::with)
    }

    /// Route a tool call by name.
    ///
    /// An unknown name is reported in the returned output; contract errors
    /// from the target tool propagate.
    pub async fn dispatch(&self, call: ToolCall, mode: Dispatch) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.get(call.name()) else {
            warn!(tool = call.name(), "Unknown tool requested");
            return Ok(ToolOutput::failure(
                call.name(),
                format!("Unknown tool: {}", call.name()),
            ));
        };
        tool.invoke(Arguments::from(call), mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{json, Map};

    /// Adds two numbers.
    #[derive(Deserialize, JsonSchema)]
    struct AddArgs {
        a: i64,
        b: i64,
    }

    /// Multiplies two numbers.
    #[derive(Deserialize, JsonSchema)]
    struct MulArgs {
        a: i64,
        b: i64,
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .with(ToolHandle::from_fn(|x: AddArgs| Ok::<_, Failure>(x.a + x.b)).unwrap())
            .with(ToolHandle::from_fn(|x: MulArgs| Ok::<_, Failure>(x.a * x.b)).unwrap())
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        let map: Map<String, serde_json::Value> = serde_json::from_value(args).unwrap();
        ToolCall::new(name, map)
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let reg = registry();
        let out = reg
            .dispatch(call("mul", json!({"a": 6, "b": 7})), Dispatch::Auto)
            .await
            .unwrap();
        assert_eq!(out.name(), "mul");
        assert_eq!(out.render(), "42");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_output() {
        let out = registry()
            .dispatch(call("divide", json!({})), Dispatch::Auto)
            .await
            .unwrap();
        assert_eq!(out.render(), "Error: Unknown tool: divide");
    }

    #[test]
    fn keeps_registration_order_and_replaces_in_place() {
        let mut reg = registry();
        assert_eq!(reg.names(), ["add", "mul"]);

        let replaced = reg.register(ToolHandle::from_fn(|x: AddArgs| Ok::<_, Failure>(x.a - x.b)).unwrap());
        assert!(replaced.is_some());
        assert_eq!(reg.names(), ["add", "mul"]);
        assert_eq!(reg.len(), 2);

        let schemas = reg.schemas();
        assert_eq!(schemas[0].name(), "add");
        assert_eq!(schemas[1].description(), "Multiplies two numbers.");
    }

    #[test]
    fn subset_filters_by_name() {
        let reg = registry().subset(["mul", "nope"]);
        assert_eq!(reg.names(), ["mul"]);
        assert!(!reg.contains("add"));
        assert!(ToolRegistry::new().is_empty());
    }
}
