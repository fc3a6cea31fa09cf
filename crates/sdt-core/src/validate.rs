//! # Template Validator
//!
//! Type-directed static check of a template against the output schema,
//! performed once per document. The walk mirrors the renderer but
//! differs at the leaves: instead of evaluating expressions against
//! real params, every `${…}` span is syntax-checked and then evaluated
//! against the synthesized example of the input schema, and the
//! resulting value's JSON type is matched against what the output
//! schema expects at that position.
//!
//! Every expression parse and every operator clause charges the
//! complexity counter; the document façade turns an excessive total
//! into a warning.

use serde_json::Value as Json;

use crate::diag::Context;
use crate::expr::{self, find_spans, is_single_span};
use crate::render::control_entry;
use crate::schema::{Additional, SchemaView};
use crate::value::{Object, Params, Value};

/// Accept-anything schema used where an array declares no item schema.
static ANY_SCHEMA: Json = Json::Null;

/// Walk `node` against `schema`, recording diagnostics into `ctx`.
pub(crate) fn validate_template(
    ctx: &Context,
    schema: SchemaView<'_>,
    node: &Value,
    example: &Params,
) {
    let schema = schema.resolve();
    match node {
        Value::String(text) => validate_string(ctx, schema, text, example),
        Value::Object(map) => {
            if control_entry(map, "$if").is_some() {
                return validate_branch(ctx, schema, map, example);
            }
            if control_entry(map, "$for").is_some() {
                return validate_loop(ctx, schema, map, example);
            }
            if control_entry(map, "$flatten").is_some() {
                return validate_flatten(ctx, schema, map, example);
            }
            validate_typed(ctx, schema, node, example)
        }
        _ => validate_typed(ctx, schema, node, example),
    }
}

fn fmt_types(types: &[&str]) -> String {
    format!("[{}]", types.join(", "))
}

/// Whether a value of JSON type `actual` satisfies the declared type
/// set. Integer and number satisfy each other: template literals and
/// expression results may carry either kind for the same schema.
fn type_allowed(schema: &SchemaView<'_>, actual: &str) -> bool {
    let types = schema.types();
    types.is_empty()
        || types.iter().any(|declared| {
            *declared == actual
                || (*declared == "integer" && actual == "number")
                || (*declared == "number" && actual == "integer")
        })
}

fn items_or_any<'a>(schema: SchemaView<'a>) -> SchemaView<'a> {
    schema
        .items()
        .unwrap_or_else(|| SchemaView::with(schema.root(), &ANY_SCHEMA))
}

fn validate_string(ctx: &Context, schema: SchemaView<'_>, text: &str, example: &Params) {
    let spans = find_spans(text);

    let mut parse_failed = false;
    for span in &spans {
        ctx.bump_complexity();
        if let Err(e) = expr::parse(span.expr) {
            parse_failed = true;
            ctx.add_error_offset(
                format!(
                    "error validating template: unable to compile expression '{}': {e}",
                    span.expr
                ),
                span.start,
                span.len(),
            );
        }
    }

    if is_single_span(text, &spans) {
        if parse_failed {
            return;
        }
        let span = spans[0];
        match expr::eval(span.expr, example) {
            Err(e) => ctx.add_error_offset(
                format!(
                    "error validating template: unable to eval expression '{}': {e}",
                    span.expr
                ),
                span.start,
                span.len(),
            ),
            Ok(value) => {
                let actual = value.json_type();
                if !type_allowed(&schema, actual) {
                    ctx.add_error_offset(
                        format!(
                            "error validating template: expression '{}' results in {actual} but expecting {}",
                            span.expr,
                            fmt_types(&schema.types()),
                        ),
                        span.start,
                        span.len(),
                    );
                }
            }
        }
        return;
    }

    // Zero or several spans: the node renders to a string.
    if !schema.types().is_empty() && !type_allowed(&schema, "string") {
        ctx.add_error(format!(
            "error validating template: string not allowed, expecting {}",
            fmt_types(&schema.types()),
        ));
    }
}

fn validate_branch(ctx: &Context, schema: SchemaView<'_>, map: &Object, example: &Params) {
    ctx.bump_complexity();

    if let Some(Value::String(condition)) = map.get("$if") {
        for span in find_spans(condition) {
            ctx.bump_complexity();
            if let Err(e) = expr::parse(span.expr) {
                ctx.add_error_offset(
                    format!(
                        "error validating template: unable to compile expression '{}': {e}",
                        span.expr
                    ),
                    span.start,
                    span.len(),
                );
            }
        }
    }

    match control_entry(map, "$then") {
        None => ctx.add_error(
            "error validating template: $then clause is required for $if branching",
        ),
        Some(consequent) => {
            validate_template(&ctx.with_path("$then"), schema, consequent, example);
        }
    }

    if let Some(alternative) = control_entry(map, "$else") {
        ctx.bump_complexity();
        validate_template(&ctx.with_path("$else"), schema, alternative, example);
    }
}

fn validate_loop(ctx: &Context, schema: SchemaView<'_>, map: &Object, example: &Params) {
    ctx.bump_complexity();

    let item = match map.get("$for") {
        Some(Value::String(text)) => {
            let spans = find_spans(text);
            if !text.starts_with("${") || !is_single_span(text, &spans) {
                ctx.add_error(
                    "error validating template: $for expression must use ${...} interpolation syntax",
                );
                return;
            }
            ctx.bump_complexity();
            match expr::eval(spans[0].expr, example) {
                Err(e) => {
                    ctx.add_error(format!(
                        "error validating template: unable to test $for expression: {e}"
                    ));
                    return;
                }
                Ok(Value::Array(items)) => match items.into_iter().next() {
                    Some(first) => first,
                    None => {
                        ctx.add_error(
                            "error validating template: $for expression result must not be empty",
                        );
                        return;
                    }
                },
                Ok(other) => {
                    ctx.add_error(format!(
                        "error validating template: $for expression must result in an array but found {}",
                        other.json_type()
                    ));
                    return;
                }
            }
        }
        Some(Value::Array(items)) => match items.first() {
            Some(first) => first.clone(),
            None => {
                ctx.add_error("error validating template: $for sequence must not be empty");
                return;
            }
        },
        _ => {
            ctx.add_error("error validating template: $for expression must be an array or string");
            return;
        }
    };

    let Some(body) = control_entry(map, "$each") else {
        ctx.add_error("error validating template: $each clause is required for $for looping");
        return;
    };

    let alias = match map.get("$as") {
        None | Some(Value::Null) => "item",
        Some(Value::String(name)) => name.as_str(),
        Some(_) => {
            ctx.add_error("error validating template: $as must be a string");
            return;
        }
    };

    let mut scope = example.clone();
    scope.insert(alias.to_owned(), item);
    let loop_name = if alias == "item" {
        "loop".to_owned()
    } else {
        format!("loop_{alias}")
    };
    scope.insert(loop_name, loop_example());

    ctx.bump_complexity();
    match body {
        // A literal sequence body merges its items into the produced
        // sequence, so each element is checked independently.
        Value::Array(elements) => {
            let item_schema = items_or_any(schema);
            for (i, element) in elements.iter().enumerate() {
                validate_template(
                    &ctx.with_path(format!("$each/{i}")),
                    item_schema,
                    element,
                    &scope,
                );
            }
        }
        _ => validate_template(&ctx.with_path("$each"), items_or_any(schema), body, &scope),
    }
}

fn loop_example() -> Value {
    let mut record = Object::new();
    record.insert("index".into(), Value::Int(0));
    record.insert("first".into(), Value::Bool(true));
    record.insert("last".into(), Value::Bool(false));
    Value::Object(record)
}

fn validate_flatten(ctx: &Context, schema: SchemaView<'_>, map: &Object, example: &Params) {
    ctx.bump_complexity();

    match map.get("$flatten") {
        // A literal sequence of sequences: every group must itself
        // satisfy the expected (array) schema.
        Some(Value::Array(groups)) => {
            for (i, group) in groups.iter().enumerate() {
                validate_template(
                    &ctx.with_path(format!("$flatten/{i}")),
                    schema,
                    group,
                    example,
                );
            }
        }
        Some(value @ Value::Object(inner)) if control_entry(inner, "$for").is_some() => {
            // The loop produces the groups, so it is checked against a
            // synthetic array-of-expected schema.
            let synthetic = serde_json::json!({"type": "array", "items": schema.raw().clone()});
            let view = SchemaView::with(schema.root(), &synthetic);
            validate_template(&ctx.with_path("$flatten"), view, value, example);
        }
        _ => ctx.add_error(
            "error validating template: $flatten value must be a sequence or a $for mapping",
        ),
    }
}

fn validate_typed(ctx: &Context, schema: SchemaView<'_>, node: &Value, example: &Params) {
    let types = schema.types();
    if types.is_empty() {
        // Untyped schemas accept anything; there is nothing to direct
        // the walk by.
        return;
    }

    let actual = node.json_type();
    if !type_allowed(&schema, actual) {
        let mut extra = String::new();
        if schema.has_type("object") {
            extra = format!(" with properties {:?}", schema.property_names());
        }
        if schema.has_type("array") {
            extra = format!(" with {} items", fmt_types(&items_or_any(schema).types()));
        }
        ctx.add_error(format!(
            "error validating template: type {actual} not allowed, expecting {}{extra}",
            fmt_types(&types),
        ));
        return;
    }

    match node {
        Value::Array(items) => {
            let item_schema = items_or_any(schema);
            for (i, item) in items.iter().enumerate() {
                validate_template(&ctx.with_path(i), item_schema, item, example);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                if let Some(property) = schema.property(key) {
                    validate_template(&ctx.with_path(key), property, value, example);
                    continue;
                }
                match schema.additional_properties() {
                    // Additional properties can describe props with a
                    // variable name.
                    Additional::Schema(additional) => {
                        validate_template(&ctx.with_path(key), additional, value, example);
                    }
                    _ => ctx.with_path(key).add_error(format!(
                        "error validating template: property {key} not in allowed set {:?}",
                        schema.property_names(),
                    )),
                }
            }
        }
        _ => {}
    }
}
