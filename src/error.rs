//! Error types for tool construction, dispatch and execution.
//!
//! Two strata:
//! - [`ToolError`]: contract violations (a tool wired up wrong). Returned as
//!   `Err` to the caller.
//! - [`Failure`]: something went wrong *inside* a tool call. Captured and
//!   reported through [`ToolOutput::error`](crate::types::ToolOutput::error).

use std::fmt;
use thiserror::Error;

/// Failure kind used when arguments cannot be bound to a function.
pub const ARGUMENT_ERROR: &str = "ArgumentError";

/// Contract-level failures raised by tool construction and dispatch.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Neither a function nor a complete name/description pair was supplied.
    #[error("Tool construction failed: {0}")]
    Construction(String),

    /// A custom tool did not supply its schema.
    #[error("Json representation of the tool is required ({tool} returned no schema)")]
    MissingSchema { tool: String },

    /// The schema could not be derived from an argument type.
    #[error("Schema derivation failed: {0}")]
    Schema(String),

    /// No synchronous implementation exists.
    #[error("Tool {tool} must implement forward() or wrap a function")]
    Unimplemented { tool: String },

    /// The asynchronous path was requested but the tool cannot provide it.
    #[error("Tool {tool} does not implement async_forward() but the asynchronous path was requested")]
    AsyncUnavailable { tool: String },

    /// Neither strategy is implemented.
    #[error("Tool {tool} must implement either forward() or async_forward()")]
    NoCapability { tool: String },
}

impl ToolError {
    /// Create a construction error.
    pub fn construction<S: ToString>(s: S) -> Self {
        ToolError::Construction(s.to_string())
    }

    /// Create a schema derivation error.
    pub fn schema<S: ToString>(s: S) -> Self {
        ToolError::Schema(s.to_string())
    }
}

/// A data-level failure raised while running a tool.
///
/// Rendered as `"<kind> - <message>"`. Any `std::error::Error` converts into
/// a `Failure` whose kind is the error's type name, so wrapped functions can
/// use `?` freely. `Failure` must not implement `std::error::Error`, or the
/// blanket `From` below would overlap with `From<T> for T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: String,
    message: String,
}

impl Failure {
    /// Build a failure with an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// A failure raised while binding call arguments.
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ARGUMENT_ERROR, message)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.kind, self.message)
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(short_type_name(std::any::type_name::<E>()), err.to_string())
    }
}

/// Last path segment of a type name, without generic parameters.
///
/// `core::num::error::ParseIntError` → `ParseIntError`.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_from_std_error_uses_type_name() {
        let err = "x".parse::<i32>().unwrap_err();
        let failure = Failure::from(err);
        assert_eq!(failure.kind(), "ParseIntError");
        assert_eq!(
            failure.to_string(),
            "ParseIntError - invalid digit found in string"
        );
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("a::b::Foo"), "Foo");
        assert_eq!(short_type_name("a::b::Foo<c::Bar>"), "Foo");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn contract_errors_name_the_tool() {
        let err = ToolError::AsyncUnavailable {
            tool: "SearchTool".into(),
        };
        assert!(err.to_string().contains("SearchTool"));
    }
}
