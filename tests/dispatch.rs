//! End-to-end checks of the public API: building tools, reading schemas,
//! dispatching calls and rendering outputs.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::num::ParseIntError;
use toolbelt::{
    builtin, Arguments, Capability, Dispatch, Failure, Tool, ToolCall, ToolError, ToolHandle,
    ToolOutput, ToolRegistry, ToolSchema,
};

/// Adds two numbers.
#[derive(Deserialize, JsonSchema)]
struct AddArgs {
    /// The first number to be added.
    a: i64,
    /// The second number to be added.
    b: i64,
}

/// Parses a base-10 integer.
#[derive(Deserialize, JsonSchema)]
struct ParseIntArgs {
    /// Digits to parse.
    text: String,
}

fn parse_int(args: ParseIntArgs) -> Result<i64, ParseIntError> {
    args.text.trim().parse()
}

/// Splits text into words.
#[derive(Deserialize, JsonSchema)]
struct SplitWordsArgs {
    text: String,
}

#[derive(Deserialize, JsonSchema)]
struct UndocumentedArgs {
    text: String,
}

/// Looks up a user record; both strategies are implemented.
struct LookupTool;

#[async_trait]
impl Tool for LookupTool {
    fn name(&self) -> &str {
        "lookup"
    }

    fn description(&self) -> &str {
        "Look up a user by id"
    }

    fn schema(&self) -> Option<ToolSchema> {
        Some(ToolSchema::new(
            "lookup",
            "Look up a user by id",
            json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}},
                "required": ["id"]
            }),
        ))
    }

    fn capability(&self) -> Capability {
        Capability::Both
    }

    fn forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        let id = args.kwargs().get("id").cloned().unwrap_or(Value::Null);
        Ok(ToolOutput::success("lookup", json!({"id": id, "via": "sync"})))
    }

    async fn async_forward(&self, args: Arguments) -> Result<ToolOutput, ToolError> {
        tokio::task::yield_now().await;
        let id = args.kwargs().get("id").cloned().unwrap_or(Value::Null);
        Ok(ToolOutput::success("lookup", json!({"id": id, "via": "async"})))
    }
}

fn call(name: &str, args: Value) -> ToolCall {
    let arguments: Map<String, Value> = serde_json::from_value(args).unwrap();
    ToolCall::new(name, arguments)
}

fn registry() -> ToolRegistry {
    ToolRegistry::new()
        .with(ToolHandle::from_fn(|args: AddArgs| Ok::<_, Failure>(args.a + args.b)).unwrap())
        .with(ToolHandle::from_fn(parse_int).unwrap())
        .with(ToolHandle::from_fn(|args: SplitWordsArgs| {
            Ok::<_, Failure>(args.text.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        })
        .unwrap())
        .with(ToolHandle::new(LookupTool).unwrap())
}

#[test]
fn schemas_follow_the_function_tool_shape() {
    let schemas: Vec<Value> = registry().schemas().iter().map(ToolSchema::to_value).collect();

    let add = &schemas[0];
    assert_eq!(add["type"], "function");
    assert_eq!(add["function"]["name"], "add");
    assert_eq!(add["function"]["description"], "Adds two numbers.");
    let params = &add["function"]["parameters"];
    assert_eq!(params["type"], "object");
    assert_eq!(params["required"], json!(["a", "b"]));
    assert_eq!(params["properties"]["a"]["type"], "integer");
    assert_eq!(
        params["properties"]["b"]["description"],
        "The second number to be added."
    );

    assert_eq!(schemas[1]["function"]["name"], "parse_int");
    assert_eq!(schemas[2]["function"]["name"], "split_words");
    assert_eq!(schemas[3]["function"]["name"], "lookup");
}

#[test]
fn undocumented_argument_type_cannot_become_a_tool() {
    let err = ToolHandle::from_fn(|args: UndocumentedArgs| Ok::<_, Failure>(args.text)).unwrap_err();
    assert!(matches!(err, ToolError::Schema(_)));
}

#[tokio::test]
async fn call_descriptor_round_trips_through_registry() {
    let tools = registry();
    let request = call("add", json!({"a": 40, "b": 2}));
    assert_eq!(
        request.to_mapping(),
        json!({"name": "add", "arguments": {"a": 40, "b": 2}})
    );

    let out = tools.dispatch(request, Dispatch::Sync).await.unwrap();
    assert_eq!(out.render(), "42");
    assert_eq!(out.to_string(), "42");
    assert!(!out.is_error());
}

#[tokio::test]
async fn function_failures_render_as_errors() {
    let out = registry()
        .dispatch(call("parse_int", json!({"text": "forty-two"})), Dispatch::Auto)
        .await
        .unwrap();
    assert!(out.output().is_absent());
    assert_eq!(
        out.render(),
        "Error: ParseIntError - invalid digit found in string"
    );

    let out = registry()
        .dispatch(call("parse_int", json!({"digits": "1"})), Dispatch::Auto)
        .await
        .unwrap();
    assert_eq!(
        out.render(),
        "Error: ArgumentError - got an unexpected keyword argument 'digits'"
    );
}

#[tokio::test]
async fn unknown_tool_is_data_not_an_error() {
    let out = registry()
        .dispatch(call("teleport", json!({})), Dispatch::Async)
        .await
        .unwrap();
    assert_eq!(out.name(), "teleport");
    assert_eq!(out.render(), "Error: Unknown tool: teleport");
}

#[tokio::test]
async fn dispatch_modes_pick_the_declared_strategy() {
    let tools = registry();
    let lookup = tools.get("lookup").unwrap();

    let auto = lookup.invoke(call("lookup", json!({"id": 7})), Dispatch::Auto).await.unwrap();
    assert_eq!(auto.render(), r#"{"id":7,"via":"async"}"#);

    let sync = lookup.invoke(call("lookup", json!({"id": 7})), Dispatch::Sync).await.unwrap();
    assert_eq!(sync.render(), r#"{"id":7,"via":"sync"}"#);

    let flag = Dispatch::from(Some(false));
    let ready = lookup.call(call("lookup", json!({"id": 1})), flag).unwrap();
    assert!(!ready.is_pending());
}

#[tokio::test]
async fn structured_outputs_render_compact_json() {
    let tools = registry();
    let words = tools
        .get("split_words")
        .unwrap()
        .invoke(Arguments::positional(["to be or"]), Dispatch::Auto)
        .await
        .unwrap();
    assert_eq!(words.render(), r#"["to","be","or"]"#);
}

#[test]
fn error_wins_over_output_when_rendering() {
    let out = ToolOutput::success("t", json!({"partial": true})).with_error("boom");
    assert_eq!(out.render(), "Error: boom");
    assert_eq!(ToolOutput::new("t").render(), "");
}

#[tokio::test]
async fn builtin_registry_grades_answers() {
    let tools = builtin::default_tools().unwrap();
    let out = tools
        .dispatch(
            call(
                "grade_answer",
                json!({"candidate": "2(x+1)", "reference": "2x+2", "method": "sympy"}),
            ),
            Dispatch::Auto,
        )
        .await
        .unwrap();
    assert_eq!(out.render(), "true");
}
