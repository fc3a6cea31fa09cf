//! # Defaults Filler
//!
//! Walks user-supplied params alongside the input schema and inserts
//! declared `default` values for absent keys, in place. Runs after
//! schema validation has already accepted the params; defaults are
//! trusted and not re-validated.

use serde_json::Value as Json;

use crate::schema::SchemaView;
use crate::value::{Params, Value};

/// Coerce a numeric schema literal to the kind the schema declares:
/// `integer` properties get an `Int`, other numeric properties a
/// `Float`. Non-numeric literals convert structurally.
pub(crate) fn coerce_number(literal: &Json, schema: &SchemaView) -> Value {
    if let Json::Number(n) = literal {
        if schema.has_type("integer") {
            if let Some(i) = n.as_i64() {
                return Value::Int(i);
            }
            return Value::Int(n.as_f64().unwrap_or(0.0) as i64);
        }
        if let Some(f) = n.as_f64() {
            return Value::Float(f);
        }
    }
    Value::from_json(literal.clone())
}

/// Insert missing defaults declared by `schema` into `params`,
/// recursing into present object properties and into object elements
/// of array properties.
pub(crate) fn fill_defaults(schema: SchemaView, params: &mut Params) {
    let schema = schema.resolve();
    let Some(properties) = schema.properties() else {
        return;
    };

    for key in properties.keys() {
        let Some(property) = schema.property(key) else {
            continue;
        };
        let property = property.resolve();

        if let Some(default) = property.default_value() {
            if !params.contains_key(key) {
                params.insert(key.clone(), coerce_number(default, &property));
            }
        }

        match params.get_mut(key) {
            Some(Value::Object(nested)) => fill_defaults(property, nested),
            Some(Value::Array(items)) => {
                if let Some(item_schema) = property.items() {
                    for item in items {
                        if let Value::Object(nested) = item {
                            fill_defaults(item_schema, nested);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}
