//! # Example Generator
//!
//! Synthesizes a representative value for a schema. The template
//! validator evaluates every embedded expression against this value, so
//! each generated leaf must carry the concrete kind the schema
//! declares; a wrong kind here would make the static type check lie.

use crate::defaults::coerce_number;
use crate::error::ExampleError;
use crate::schema::{Additional, SchemaView};
use crate::value::{Object, Value};

/// Generate a representative value for `schema`.
///
/// Preference order: `examples[0]`, then `default`, then `enum[0]`,
/// then a per-type placeholder (`true`, `1`, `1.0`, `"string"`, an
/// array of one generated item, an object of generated properties).
///
/// # Errors
///
/// Fails on schemas declaring multiple types and on objects whose
/// `additionalProperties` is anything other than the literal `false`:
/// without a fixed field set there is nothing to type-check expressions
/// against.
pub(crate) fn generate(schema: SchemaView) -> Result<Value, ExampleError> {
    let schema = schema.resolve();

    let types = schema.types();
    if types.len() > 1 {
        return Err(ExampleError::MultipleTypes);
    }

    if let Some(example) = schema.first_example() {
        return Ok(coerce_number(example, &schema));
    }
    if let Some(default) = schema.default_value() {
        return Ok(coerce_number(default, &schema));
    }
    if let Some(first) = schema.first_enum_value() {
        return Ok(coerce_number(first, &schema));
    }

    match types.first().copied() {
        Some("boolean") => Ok(Value::Bool(true)),
        Some("integer") => Ok(Value::Int(1)),
        Some("number") => Ok(Value::Float(1.0)),
        Some("string") => Ok(Value::String("string".into())),
        Some("array") => {
            let item = match schema.items() {
                Some(items) => generate(items)?,
                None => Value::Null,
            };
            Ok(Value::Array(vec![item]))
        }
        Some("object") => {
            match schema.additional_properties() {
                Additional::Unset | Additional::Allowed(false) => {}
                Additional::Allowed(true) | Additional::Schema(_) => {
                    return Err(ExampleError::AdditionalProperties);
                }
            }
            let mut object = Object::new();
            if let Some(properties) = schema.properties() {
                for key in properties.keys() {
                    if let Some(property) = schema.property(key) {
                        object.insert(key.clone(), generate(property)?);
                    }
                }
            }
            Ok(Value::Object(object))
        }
        _ => Ok(Value::Null),
    }
}
