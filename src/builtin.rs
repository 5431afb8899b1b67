//! Built-in tools shipped with the CLI.
//!
//! `add` and `extract_answer` are plain functions; `grade_answer` and
//! `delay` are hand-written [`Tool`] types with explicit schemas, the latter
//! only implementing the asynchronous strategy.

use crate::error::{Failure, ToolError};
use crate::grading::{self, GradingMethod};
use crate::tools::function::bind_arguments;
use crate::tools::{Capability, Tool, ToolHandle, ToolRegistry, ToolSchema};
use crate::types::{Arguments, ToolOutput};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Names of every built-in tool, in registration order.
pub const BUILTIN_TOOLS: &[&str] = &["add", "extract_answer", "grade_answer", "delay"];

/// Every built-in tool.
pub fn default_tools() -> Result<ToolRegistry, ToolError> {
    Ok(ToolRegistry::new()
        .with(ToolHandle::from_fn(add)?)
        .with(ToolHandle::from_fn(extract_answer)?)
        .with(ToolHandle::new(GradeAnswerTool)?)
        .with(ToolHandle::new(DelayTool::default())?))
}

/// Bind `args` onto `params` and deserialize them into `T`.
fn parse_args<T: DeserializeOwned>(params: &[&str], args: Arguments) -> Result<T, Failure> {
    let bound = bind_arguments(params, args)?;
    serde_json::from_value(Value::Object(bound)).map_err(|e| Failure::argument(e.to_string()))
}

// ----- add -----

/// Adds two numbers.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddArgs {
    /// The first number to be added.
    pub a: i64,
    /// The second number to be added.
    pub b: i64,
}

pub fn add(args: AddArgs) -> Result<i64, Failure> {
    args.a
        .checked_add(args.b)
        .ok_or_else(|| Failure::new("OverflowError", "integer addition overflowed"))
}

// ----- extract_answer -----

/// Extracts the final boxed answer from a model response.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractAnswerArgs {
    /// The full response text.
    pub text: String,
}

/// `None` (rendered as an empty string) when the text has no box.
pub fn extract_answer(args: ExtractAnswerArgs) -> Result<Option<String>, Failure> {
    Ok(grading::extract_answer(&args.text))
}

// ----- grade_answer -----

#[derive(Debug, Deserialize)]
struct GradeAnswerArgs {
    candidate: String,
    reference: String,
    #[serde(default)]
    method: GradingMethod,
}

/// Grades a candidate answer against a reference.
///
/// Output is a boolean; metadata records the method used.
#[derive(Debug, Default)]
pub struct GradeAnswerTool;

impl GradeAnswerTool {
    const PARAMS: [&'static str; 3] = ["candidate", "reference", "method"];

    fn grade(&self, args: Arguments) -> Result<(bool, GradingMethod), Failure> {
        let args: GradeAnswerArgs = parse_args(&Self::PARAMS, args)?;
        Ok((args.method.grade(&args.candidate, &args.reference), args.method))
    }
}

impl Tool for GradeAnswerTool {
    fn name(&self) -> &str {
        "grade_answer"
    }

    fn description(&self) -> &str {
        "Check whether a candidate math answer matches the reference answer."
    }

    fn schema(&self) -> Option<ToolSchema> {
        Some(ToolSchema::new(
            self.name(),
            self.description(),
            json!({
                "type": "object",
                "properties": {
                    "candidate": {
                        "type": "string",
                        "description": "The answer to grade, e.g. the output of extract_answer."
                    },
                    "reference": {
                        "type": "string",
                        "description": "The known correct answer."
                    },
                    "method": {
                        "type": "string",
                        "enum": ["mathd", "sympy", "either"],
                        "description": "Grader to use. Defaults to either."
                    }
                },
                "required": ["candidate", "reference"]
            }),
        ))
    }

    fn capability(&self) -> Capability {
        Capability::Synchronous
    }

    fn forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        Ok(match self.grade(args) {
            Ok((correct, method)) => {
                let mut metadata = Map::new();
                metadata.insert("method".into(), Value::String(method.to_string()));
                ToolOutput::success(self.name(), correct).with_metadata(metadata)
            }
            Err(failure) => ToolOutput::failure(self.name(), failure.to_string()),
        })
    }
}

// ----- delay -----

#[derive(Debug, Deserialize)]
struct DelayArgs {
    seconds: f64,
    #[serde(default)]
    message: Option<String>,
}

/// Sleeps without blocking the runtime, then answers with a message.
///
/// Only the asynchronous strategy exists; synchronous dispatch fails with
/// [`ToolError::Unimplemented`].
#[derive(Debug)]
pub struct DelayTool {
    /// Requested waits are clamped to this.
    pub max_wait: Duration,
}

impl Default for DelayTool {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
        }
    }
}

impl DelayTool {
    const PARAMS: [&'static str; 2] = ["seconds", "message"];

    fn wait_for(&self, seconds: f64) -> Result<Duration, Failure> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Failure::new(
                "ValueError",
                format!("seconds must be a non-negative number, got {}", seconds),
            ));
        }
        Ok(Duration::try_from_secs_f64(seconds)
            .map_or(self.max_wait, |wait| wait.min(self.max_wait)))
    }
}

#[async_trait]
impl Tool for DelayTool {
    fn name(&self) -> &str {
        "delay"
    }

    fn description(&self) -> &str {
        "Wait for a number of seconds, then reply with a message."
    }

    fn schema(&self) -> Option<ToolSchema> {
        Some(ToolSchema::new(
            self.name(),
            self.description(),
            json!({
                "type": "object",
                "properties": {
                    "seconds": {"type": "number", "minimum": 0},
                    "message": {"type": "string"}
                },
                "required": ["seconds"]
            }),
        ))
    }

    fn capability(&self) -> Capability {
        Capability::Asynchronous
    }

    async fn async_forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        let parsed = parse_args::<DelayArgs>(&Self::PARAMS, args)
            .and_then(|a| Ok((self.wait_for(a.seconds)?, a.message)));
        let (wait, message) = match parsed {
            Ok(parsed) => parsed,
            Err(failure) => return Ok(ToolOutput::failure(self.name(), failure.to_string())),
        };

        tokio::time::sleep(wait).await;
        let message = message.unwrap_or_else(|| format!("waited {:.3}s", wait.as_secs_f64()));
        Ok(ToolOutput::success(self.name(), message))
    }
}
