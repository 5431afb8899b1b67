//! Tools backed by a plain Rust function.

use crate::error::{Failure, ToolError};
use crate::tools::schema::function_schema;
use crate::tools::traits::{Capability, Tool, ToolSchema};
use crate::types::{Arguments, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use tracing::warn;

/// A tool wrapping `Fn(A) -> Result<R, E>`.
///
/// Name, description and parameters all come from `A` (see
/// [`function_schema`]). Positional arguments bind to `A`'s fields in
/// declaration order, keyword arguments by name. Every failure, whether
/// binding, the function itself or serializing its result, ends up in
/// [`ToolOutput::error`]; `forward` never returns `Err`.
pub struct FunctionTool<A, F> {
    schema: ToolSchema,
    params: Vec<String>,
    func: F,
    _args: PhantomData<fn(A)>,
}

impl<A, R, E, F> FunctionTool<A, F>
where
    A: DeserializeOwned + JsonSchema,
    R: Serialize,
    E: Into<Failure>,
    F: Fn(A) -> Result<R, E> + Send + Sync,
{
    pub fn new(func: F) -> Result<Self, ToolError> {
        let schema = function_schema::<A>()?;
        let params = schema
            .parameter_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Self {
            schema,
            params,
            func,
            _args: PhantomData,
        })
    }

    fn run(&self, args: Arguments) -> Result<Value, Failure> {
        let bound = bind_arguments(&self.params, args)?;
        let input: A = serde_json::from_value(Value::Object(bound))
            .map_err(|e| Failure::argument(e.to_string()))?;
        let result = (self.func)(input).map_err(Into::<Failure>::into)?;
        Ok(serde_json::to_value(result)?)
    }
}

#[async_trait]
impl<A, R, E, F> Tool for FunctionTool<A, F>
where
    A: DeserializeOwned + JsonSchema,
    R: Serialize,
    E: Into<Failure>,
    F: Fn(A) -> Result<R, E> + Send + Sync,
{
    fn name(&self) -> &str {
        self.schema.name()
    }

    fn description(&self) -> &str {
        self.schema.description()
    }

    fn schema(&self) -> Option<ToolSchema> {
        Some(self.schema.clone())
    }

    fn capability(&self) -> Capability {
        Capability::Synchronous
    }

    fn forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        let name = self.name();
        Ok(match self.run(args) {
            Ok(value) => ToolOutput::success(name, value),
            Err(failure) => {
                warn!(tool = name, "Tool call failed: {}", failure);
                ToolOutput::failure(name, failure.to_string())
            }
        })
    }
}

/// Map positional arguments onto parameter names and merge keyword arguments.
pub(crate) fn bind_arguments<S: AsRef<str>>(
    params: &[S],
    args: Arguments,
) -> Result<Map<String, Value>, Failure> {
    let (positional, mut keyword) = args.into_parts();

    if positional.len() > params.len() {
        return Err(Failure::argument(format!(
            "takes {} positional arguments but {} were given",
            params.len(),
            positional.len()
        )));
    }

    if let Some(unknown) = keyword
        .keys()
        .find(|k| !params.iter().any(|p| AsRef::<str>::as_ref(p) == k.as_str()))
    {
        return Err(Failure::argument(format!(
            "got an unexpected keyword argument '{}'",
            unknown
        )));
    }

    let mut bound = Map::new();
    for (name, value) in params.iter().zip(positional) {
        let name: &str = name.as_ref();
        if keyword.contains_key(name) {
            return Err(Failure::argument(format!(
                "got multiple values for argument '{}'",
                name
            )));
        }
        bound.insert(name.to_string(), value);
    }
    bound.append(&mut keyword);
    Ok(bound)
}
