//! Schema derivation for function-backed tools.
//!
//! A function's "signature and docstring" is its argument type: the fields
//! are the parameters, the field types and doc comments become their JSON
//! schema, and the type's own doc comment becomes the tool description.
//!
//! ```ignore
//! /// Adds two numbers.
//! #[derive(Deserialize, JsonSchema)]
//! struct AddArgs {
//!     /// The first number to be added.
//!     a: i64,
//!     /// The second number to be added.
//!     b: i64,
//! }
//!
//! let schema = function_schema::<AddArgs>()?;
//! assert_eq!(schema.name(), "add");
//! assert_eq!(schema.required(), ["a", "b"]);
//! ```

use crate::error::ToolError;
use crate::tools::traits::ToolSchema;
use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};

/// Suffixes stripped from an argument type's name to get the tool name.
const NAME_SUFFIXES: &[&str] = &["_arguments", "_parameters", "_params", "_args", "_input"];

/// Derive the schema record for a function taking `A`.
pub fn function_schema<A: JsonSchema>() -> Result<ToolSchema, ToolError> {
    let generator = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let schema = generator.into_root_schema_for::<A>();
    let value = serde_json::to_value(schema).map_err(ToolError::schema)?;

    let Value::Object(mut root) = value else {
        return Err(ToolError::schema(format!(
            "{} does not describe an object",
            A::schema_name()
        )));
    };

    let title = match root.remove("title") {
        Some(Value::String(title)) => title,
        _ => A::schema_name().into_owned(),
    };
    let name = tool_name_from_type(&title);
    if name.is_empty() {
        return Err(ToolError::schema(format!("cannot derive a tool name from '{}'", title)));
    }

    let description = match root.remove("description") {
        Some(Value::String(desc)) if !desc.trim().is_empty() => desc.trim().to_string(),
        _ => {
            return Err(ToolError::schema(format!(
                "{} needs a doc comment to describe the tool",
                title
            )))
        }
    };

    let parameters = object_parameters(&title, root)?;
    Ok(ToolSchema::new(name, description, parameters))
}

/// Reshape the root schema into `{"type": "object", "properties", "required", ...}`.
fn object_parameters(title: &str, mut root: Map<String, Value>) -> Result<Value, ToolError> {
    root.remove("$schema");

    match root.remove("type") {
        Some(Value::String(t)) if t == "object" => {}
        other => {
            return Err(ToolError::schema(format!(
                "{} must be a struct with named fields (schema type: {})",
                title,
                other.unwrap_or(Value::Null)
            )))
        }
    }

    let properties = root
        .remove("properties")
        .unwrap_or_else(|| Value::Object(Map::new()));
    let required = root
        .remove("required")
        .unwrap_or_else(|| Value::Array(Vec::new()));

    let mut params = Map::new();
    params.insert("type".into(), Value::String("object".into()));
    params.insert("properties".into(), properties);
    params.insert("required".into(), required);
    params.append(&mut root);
    Ok(Value::Object(params))
}

/// `AddArgs` → `add`, `SearchGoogleParams` → `search_google`.
pub fn tool_name_from_type(type_name: &str) -> String {
    let snake = to_snake_case(type_name);
    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = snake.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return stripped.to_string();
            }
        }
    }
    snake
}

fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    /// Adds two numbers.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct AddArgs {
        /// The first number to be added.
        a: i64,
        /// The second number to be added.
        b: i64,
    }

    /// Search the web.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct SearchGoogleParams {
        /// Query text.
        query: String,
        /// Number of result pages.
        #[serde(default)]
        num_result_pages: Option<u32>,
        filter: Filter,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Filter {
        site: String,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Undocumented {
        x: i64,
    }

    /// Not an object.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Wrapper(i64);

    #[test]
    fn derives_name_description_and_required() {
        let schema = function_schema::<AddArgs>().unwrap();
        let value = schema.to_value();

        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "add");
        assert_eq!(value["function"]["description"], "Adds two numbers.");
        assert_eq!(value["function"]["parameters"]["type"], "object");
        assert_eq!(schema.required(), ["a", "b"]);
        assert_eq!(schema.parameter_names(), ["a", "b"]);
        assert_eq!(
            value["function"]["parameters"]["properties"]["a"]["description"],
            "The first number to be added."
        );
    }

    #[test]
    fn optional_fields_are_not_required_and_subschemas_inline() {
        let schema = function_schema::<SearchGoogleParams>().unwrap();
        assert_eq!(schema.name(), "search_google");
        assert_eq!(schema.required(), ["query", "filter"]);
        assert_eq!(
            schema.parameter_names(),
            ["query", "num_result_pages", "filter"]
        );
        let filter = &schema.parameters()["properties"]["filter"];
        assert_eq!(filter["type"], "object");
        assert!(schema.parameters().get("$schema").is_none());
    }

    #[test]
    fn missing_doc_comment_is_rejected() {
        let err = function_schema::<Undocumented>().unwrap_err();
        assert!(matches!(err, ToolError::Schema(_)));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(matches!(
            function_schema::<Wrapper>(),
            Err(ToolError::Schema(_))
        ));
    }

    #[test]
    fn tool_names_from_type_names() {
        assert_eq!(tool_name_from_type("AddArgs"), "add");
        assert_eq!(tool_name_from_type("HTTPGetInput"), "http_get");
        assert_eq!(tool_name_from_type("extract_answer"), "extract_answer");
        assert_eq!(tool_name_from_type("Args"), "args");
        assert_eq!(tool_name_from_type("Sha256Params"), "sha256");
    }
}
