//! # Shorthand Renderer
//!
//! Compact single-line rendering of a value tree, the `-o shorthand`
//! format: `name: Alice, address{city: X, zip: 12345}, tags[a, b]`.
//! Strings are quoted only when they would be ambiguous.

use sdt_core::{Object, Value};

/// Render a value in shorthand form. Top-level objects drop the outer
/// braces.
pub fn render(value: &Value) -> String {
    match value {
        Value::Object(object) => entries(object),
        other => item(other),
    }
}

fn entries(object: &Object) -> String {
    object
        .iter()
        .map(|(key, value)| entry(key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn entry(key: &str, value: &Value) -> String {
    match value {
        Value::Object(object) => format!("{key}{{{}}}", entries(object)),
        Value::Array(array) => format!("{key}[{}]", items(array)),
        scalar => format!("{key}: {}", scalar_text(scalar)),
    }
}

fn items(array: &[Value]) -> String {
    array.iter().map(item).collect::<Vec<_>>().join(", ")
}

fn item(value: &Value) -> String {
    match value {
        Value::Object(object) => format!("{{{}}}", entries(object)),
        Value::Array(array) => format!("[{}]", items(array)),
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quoting(s) => format!("{s:?}"),
        other => {
            let text = other.to_text();
            if text.is_empty() && other.is_null() {
                "null".to_owned()
            } else {
                text
            }
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s != s.trim()
        || matches!(s, "null" | "true" | "false")
        || s.parse::<f64>().is_ok()
        || s.chars().any(|c| ",:{}[]\"".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    #[test]
    fn test_flat_object() {
        let v = value(serde_json::json!({"name": "Alice", "age": 30}));
        assert_eq!(render(&v), "name: Alice, age: 30");
    }

    #[test]
    fn test_nested_object_uses_braces() {
        let v = value(serde_json::json!({"address": {"city": "Berlin", "zip": 10117}}));
        assert_eq!(render(&v), "address{city: Berlin, zip: 10117}");
    }

    #[test]
    fn test_arrays_use_brackets() {
        let v = value(serde_json::json!({"tags": ["a", "b"], "rows": [[1, 2], [3]]}));
        assert_eq!(render(&v), "tags[a, b], rows[[1, 2], [3]]");
    }

    #[test]
    fn test_ambiguous_strings_quoted() {
        let v = value(serde_json::json!({"a": "true", "b": "1.5", "c": "x, y", "d": ""}));
        assert_eq!(render(&v), r#"a: "true", b: "1.5", c: "x, y", d: """#);
    }

    #[test]
    fn test_null_and_booleans() {
        let v = value(serde_json::json!({"a": null, "b": false}));
        assert_eq!(render(&v), "a: null, b: false");
    }

    #[test]
    fn test_scalar_top_level() {
        assert_eq!(render(&value(serde_json::json!(42))), "42");
    }
}
