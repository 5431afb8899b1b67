//! toolbelt: a uniform tool-invocation layer for agents.
//!
//! Plain functions and hand-written tool types are exposed under one
//! contract: each tool advertises a JSON schema, takes a structured call and
//! returns a [`ToolOutput`] whose rendered string is safe to hand back to a
//! model. Failures inside a tool are data, not panics or early returns.

pub mod builtin;
pub mod config;
pub mod error;
pub mod grading;
pub mod tools;
pub mod types;

pub use error::{Failure, ToolError};
pub use tools::{Capability, Dispatch, Invocation, Tool, ToolHandle, ToolRegistry, ToolSchema};
pub use types::{Arguments, OutputValue, ToolCall, ToolOutput};
