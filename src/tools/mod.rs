//! Tool handles and capability-based dispatch.
//!
//! A [`ToolHandle`] is what callers hold: a validated tool with its resolved
//! schema. It is built either from a custom [`Tool`] implementation
//! ([`ToolHandle::new`]) or from a plain function ([`ToolHandle::from_fn`]),
//! and invoked through [`ToolHandle::call`] / [`ToolHandle::invoke`].

pub mod function;
pub mod registry;
pub mod schema;
pub mod traits;

pub use function::FunctionTool;
pub use registry::ToolRegistry;
pub use schema::function_schema;
pub use traits::{Capability, SchemaKind, Tool, ToolDefinition, ToolSchema};

use crate::error::{Failure, ToolError};
use crate::types::{Arguments, ToolOutput};
use futures::future::{self, BoxFuture};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::IntoFuture;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Dispatch selector
// ---------------------------------------------------------------------------

/// Which execution strategy an invocation should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// Prefer a genuine asynchronous implementation, else the synchronous one.
    #[default]
    Auto,
    /// Always call `forward`.
    Sync,
    /// Always call `async_forward`.
    Async,
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

impl FromStr for Dispatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            other => Err(format!("unknown dispatch mode '{}' (expected auto, sync or async)", other)),
        }
    }
}

/// `Some(true)` → async, `Some(false)` → sync, `None` → auto.
impl From<Option<bool>> for Dispatch {
    fn from(use_async: Option<bool>) -> Self {
        match use_async {
            Some(true) => Self::Async,
            Some(false) => Self::Sync,
            None => Self::Auto,
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Result of [`ToolHandle::call`]: finished, or waiting on the async path.
pub enum Invocation<'a> {
    Ready(ToolOutput),
    Pending(BoxFuture<'a, Result<ToolOutput, ToolError>>),
}

impl Invocation<'_> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(output) => f.debug_tuple("Ready").field(output).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl<'a> IntoFuture for Invocation<'a> {
    type Output = Result<ToolOutput, ToolError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(output) => Box::pin(future::ready(Ok(output))),
            Self::Pending(fut) => fut,
        }
    }
}

// ---------------------------------------------------------------------------
// Tool handle
// ---------------------------------------------------------------------------

/// A constructed tool: always carries a resolved schema.
#[derive(Clone)]
pub struct ToolHandle {
    tool: Arc<dyn Tool>,
    schema: Arc<ToolSchema>,
}

impl ToolHandle {
    /// Wrap a custom tool. The tool must have a name, a description and a
    /// schema advertised under that same name.
    pub fn new<T: Tool + 'static>(tool: T) -> Result<Self, ToolError> {
        if tool.name().is_empty() {
            return Err(ToolError::construction(format!(
                "Name is required for {}",
                tool.type_name()
            )));
        }
        if tool.description().is_empty() {
            return Err(ToolError::construction(format!(
                "Description is required for {}",
                tool.type_name()
            )));
        }
        let schema = tool.schema().ok_or_else(|| ToolError::MissingSchema {
            tool: tool.type_name().to_string(),
        })?;
        if schema.name() != tool.name() {
            return Err(ToolError::construction(format!(
                "{} advertises schema '{}' but is named '{}'",
                tool.type_name(),
                schema.name(),
                tool.name()
            )));
        }

        debug!(
            tool = tool.name(),
            capability = ?tool.capability(),
            "Constructed tool"
        );
        Ok(Self {
            tool: Arc::new(tool),
            schema: Arc::new(schema),
        })
    }

    /// Wrap a function; name, description and schema are derived from its
    /// argument type.
    pub fn from_fn<A, R, E, F>(func: F) -> Result<Self, ToolError>
    where
        A: DeserializeOwned + JsonSchema + 'static,
        R: Serialize + 'static,
        E: Into<Failure> + 'static,
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        Self::new(FunctionTool::new(func)?)
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }

    pub fn description(&self) -> &str {
        self.tool.description()
    }

    /// The schema resolved at construction.
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn capability(&self) -> Capability {
        self.tool.capability()
    }

    pub fn type_name(&self) -> &'static str {
        self.tool.type_name()
    }

    /// Run the synchronous strategy directly.
    pub fn forward(&self, args: impl Into<Arguments>) -> Result<ToolOutput, ToolError> {
        self.tool.forward(args.into())
    }

    /// Run the asynchronous strategy directly.
    pub async fn async_forward(&self, args: impl Into<Arguments>) -> Result<ToolOutput, ToolError> {
        self.tool.async_forward(args.into()).await
    }

    /// Select a strategy for `mode` and start the call.
    ///
    /// Capability errors are returned immediately; the synchronous path
    /// completes before returning, the asynchronous one yields a
    /// [`Invocation::Pending`] future.
    pub fn call(&self, args: impl Into<Arguments>, mode: Dispatch) -> Result<Invocation<'_>, ToolError> {
        let args = args.into();
        let capability = self.tool.capability();
        debug!(tool = self.name(), %mode, ?capability, "Dispatching tool call");

        match mode {
            Dispatch::Async if capability.has_async_path() => Ok(self.pending(args)),
            Dispatch::Async => Err(ToolError::AsyncUnavailable {
                tool: self.type_name().to_string(),
            }),
            Dispatch::Sync => self.tool.forward(args).map(Invocation::Ready),
            Dispatch::Auto if capability.is_async() => Ok(self.pending(args)),
            Dispatch::Auto if capability.is_sync() => self.tool.forward(args).map(Invocation::Ready),
            Dispatch::Auto => Err(ToolError::NoCapability {
                tool: self.type_name().to_string(),
            }),
        }
    }

    /// [`call`](Self::call) and wait for the result.
    pub async fn invoke(&self, args: impl Into<Arguments>, mode: Dispatch) -> Result<ToolOutput, ToolError> {
        self.call(args, mode)?.await
    }

    fn pending(&self, args: Arguments) -> Invocation<'_> {
        Invocation::Pending(self.tool.async_forward(args))
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.name())
            .field("type", &self.type_name())
            .field("capability", &self.capability())
            .finish()
    }
}
