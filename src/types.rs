//! Value types shared by tools and their callers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Number, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// Call descriptor
// ---------------------------------------------------------------------------

/// A tool call request: which tool, with which arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// `{"name": ..., "arguments": {...}}`, verbatim.
    pub fn to_mapping(&self) -> Value {
        json!({
            "name": self.name,
            "arguments": self.arguments,
        })
    }

    /// Split into name and arguments.
    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.name, self.arguments)
    }
}

// ---------------------------------------------------------------------------
// Call arguments
// ---------------------------------------------------------------------------

/// Positional and keyword arguments for a single invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    keyword: Map<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Map::new(),
        }
    }

    /// Keyword arguments only.
    pub fn keyword(keyword: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            keyword,
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    pub fn args(&self) -> &[Value] {
        &self.positional
    }

    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.keyword
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Value>, Map<String, Value>) {
        (self.positional, self.keyword)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(keyword: Map<String, Value>) -> Self {
        Self::keyword(keyword)
    }
}

impl From<ToolCall> for Arguments {
    fn from(call: ToolCall) -> Self {
        Self::keyword(call.arguments)
    }
}

// ---------------------------------------------------------------------------
// Output values
// ---------------------------------------------------------------------------

/// A non-structured output value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// What a tool produced: nothing, a scalar, or a structured value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OutputValue {
    #[default]
    Absent,
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(Map<String, Value>),
}

impl OutputValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True for sequences and mappings.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Textual form: empty when absent, compact JSON when structured.
    pub fn render(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Scalar(scalar) => scalar.to_string(),
            Self::Sequence(items) => {
                serde_json::to_string(items).expect("JSON values always serialize")
            }
            Self::Mapping(map) => serde_json::to_string(map).expect("JSON values always serialize"),
        }
    }

    /// The equivalent JSON value (`null` when absent).
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl From<Value> for OutputValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::Text(s)),
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => Self::Mapping(map),
        }
    }
}

impl From<OutputValue> for Value {
    fn from(value: OutputValue) -> Self {
        match value {
            OutputValue::Absent => Value::Null,
            OutputValue::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            OutputValue::Scalar(Scalar::Number(n)) => Value::Number(n),
            OutputValue::Scalar(Scalar::Text(s)) => Value::String(s),
            OutputValue::Sequence(items) => Value::Array(items),
            OutputValue::Mapping(map) => Value::Object(map),
        }
    }
}

impl From<&str> for OutputValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for OutputValue {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Text(s))
    }
}

impl From<bool> for OutputValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i32> for OutputValue {
    fn from(n: i32) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<i64> for OutputValue {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<u64> for OutputValue {
    fn from(n: u64) -> Self {
        Self::Scalar(Scalar::Number(n.into()))
    }
}

impl From<f64> for OutputValue {
    /// Non-finite floats have no JSON form and become [`OutputValue::Absent`].
    fn from(n: f64) -> Self {
        Value::from(n).into()
    }
}

impl From<Vec<Value>> for OutputValue {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Map<String, Value>> for OutputValue {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl Serialize for OutputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Self::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Self::Scalar(Scalar::Text(s)) => serializer.serialize_str(s),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Mapping(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for OutputValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// Output descriptor
// ---------------------------------------------------------------------------

/// Result of executing a tool.
///
/// Produced once per invocation and never mutated afterwards; the
/// `with_*` builders consume the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    name: String,
    #[serde(default, skip_serializing_if = "OutputValue::is_absent")]
    output: OutputValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

impl ToolOutput {
    /// An output with nothing set but the tool name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: OutputValue::Absent,
            error: None,
            metadata: None,
        }
    }

    pub fn success(name: impl Into<String>, output: impl Into<OutputValue>) -> Self {
        Self::new(name).with_output(output)
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(name).with_error(error)
    }

    pub fn with_output(mut self, output: impl Into<OutputValue>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &OutputValue {
        &self.output
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    /// Whether the call failed. An error wins over any output.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// String form fed back to the model.
    ///
    /// Precedence: error, then absent output (empty string), then structured
    /// output as compact JSON, then the scalar's display form.
    pub fn render(&self) -> String {
        match &self.error {
            Some(error) => format!("Error: {}", error),
            None => self.output.render(),
        }
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_to_mapping_is_verbatim() {
        let mut args = Map::new();
        args.insert("query".into(), json!("capital of France"));
        args.insert("pages".into(), json!(5));
        let call = ToolCall::new("search", args);

        assert_eq!(
            call.to_mapping(),
            json!({"name": "search", "arguments": {"query": "capital of France", "pages": 5}})
        );
    }

    #[test]
    fn tool_call_deserializes_without_arguments() {
        let call: ToolCall = serde_json::from_str(r#"{"name": "ping"}"#).unwrap();
        assert_eq!(call.name(), "ping");
        assert!(call.arguments().is_empty());
    }

    #[test]
    fn error_wins_over_partial_output() {
        let out = ToolOutput::success("calc", 41).with_error("ZeroDivisionError - division by zero");
        assert_eq!(out.render(), "Error: ZeroDivisionError - division by zero");
        assert!(out.is_error());
    }

    #[test]
    fn absent_output_renders_empty() {
        assert_eq!(ToolOutput::new("noop").render(), "");
        assert_eq!(ToolOutput::new("noop").to_string(), "");
    }

    #[test]
    fn structured_output_renders_compact_json_in_order() {
        let out = ToolOutput::success("search", json!({"zeta": 1, "alpha": [1, "two", null]}));
        assert_eq!(out.render(), r#"{"zeta":1,"alpha":[1,"two",null]}"#);

        let seq = ToolOutput::success("list", vec![json!(1), json!(2)]);
        assert_eq!(seq.render(), "[1,2]");
    }

    #[test]
    fn scalars_render_with_display() {
        assert_eq!(ToolOutput::success("t", "plain text").render(), "plain text");
        assert_eq!(ToolOutput::success("t", 42).render(), "42");
        assert_eq!(ToolOutput::success("t", 2.5).render(), "2.5");
        assert_eq!(ToolOutput::success("t", true).render(), "true");
        assert_eq!(ToolOutput::success("t", "").render(), "");
    }

    #[test]
    fn null_value_becomes_absent() {
        assert!(OutputValue::from(Value::Null).is_absent());
        assert!(OutputValue::from(f64::NAN).is_absent());
    }

    #[test]
    fn output_serializes_without_empty_fields() {
        let out = ToolOutput::success("calc", 3);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"name": "calc", "output": 3})
        );

        let mut meta = Map::new();
        meta.insert("elapsed_ms".into(), json!(12));
        let failed = ToolOutput::failure("calc", "boom").with_metadata(meta);
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["error"], "boom");
        assert_eq!(value["metadata"]["elapsed_ms"], 12);
        assert!(value.get("output").is_none());

        let back: ToolOutput = serde_json::from_value(value).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn arguments_from_tool_call_are_keyword_only() {
        let mut map = Map::new();
        map.insert("a".into(), json!(1));
        let args = Arguments::from(ToolCall::new("add", map));
        assert!(args.args().is_empty());
        assert_eq!(args.kwargs()["a"], 1);

        let built = Arguments::new().arg(1).kwarg("b", 2);
        assert_eq!(built.args(), &[json!(1)]);
        assert_eq!(built.kwargs()["b"], 2);
    }
}
