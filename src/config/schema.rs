//! Configuration schema for toolbelt.toml.

use crate::tools::Dispatch;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbeltConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Dispatch mode for `call` when `--mode` is not given.
    pub dispatch: Dispatch,

    /// Built-in tools to enable. Empty enables all of them.
    pub tools: Vec<String>,
}

impl Default for ToolbeltConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            dispatch: Dispatch::Auto,
            tools: Vec::new(),
        }
    }
}

impl ToolbeltConfig {
    /// Whether the named tool is enabled.
    pub fn is_enabled(&self, tool: &str) -> bool {
        self.tools.is_empty() || self.tools.iter().any(|t| t == tool)
    }
}
