//! # Template Evaluator
//!
//! Recursive rendering of a template tree against an environment of
//! real parameter values. Data-level failures never abort the walk:
//! they are recorded as diagnostics at the offending path, the subtree
//! yields null, and siblings keep rendering.
//!
//! Dispatch order for control mappings is `$if`, `$for`, `$flatten`;
//! only the first reserved key present fires. Reserved-looking keys
//! beyond those three are passed through as literal keys.

use crate::diag::Context;
use crate::expr::{self, find_spans, is_single_span};
use crate::value::{Object, Params, Value};

/// Look up a control key, treating an explicit null the same as an
/// absent key.
pub(crate) fn control_entry<'a>(map: &'a Object, key: &str) -> Option<&'a Value> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Render `node` under `env`, collecting diagnostics into `ctx`.
pub(crate) fn render(ctx: &Context, node: &Value, env: &Params) -> Value {
    match node {
        Value::Object(map) => {
            if control_entry(map, "$if").is_some() {
                return render_branch(ctx, map, env);
            }
            if control_entry(map, "$for").is_some() {
                return render_loop(ctx, map, env);
            }
            if control_entry(map, "$flatten").is_some() {
                return render_flatten(ctx, map, env);
            }
            render_mapping(ctx, map, env)
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let rendered = render(&ctx.with_path(i), item, env);
                if !rendered.is_null() {
                    out.push(rendered);
                }
            }
            Value::Array(out)
        }
        Value::String(text) => render_interpolation(ctx, text, env),
        scalar => scalar.clone(),
    }
}

/// Interpolate `${…}` spans. A string that is exactly one span yields
/// the expression's value of whatever type; otherwise each span is
/// substituted by its textual form and the result is a string. Failed
/// spans yield null (single-span) or the empty string (multi-span),
/// plus a diagnostic pointing into the span.
fn render_interpolation(ctx: &Context, text: &str, env: &Params) -> Value {
    let spans = find_spans(text);

    if is_single_span(text, &spans) {
        let span = spans[0];
        return match expr::eval(span.expr, env) {
            Ok(value) => value,
            Err(e) => {
                ctx.add_error_offset(format!("error rendering: {e}"), span.start, span.len());
                Value::Null
            }
        };
    }

    if spans.is_empty() {
        return Value::String(text.to_owned());
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.start]);
        match expr::eval(span.expr, env) {
            Ok(value) => out.push_str(&value.to_text()),
            Err(e) => {
                ctx.add_error_offset(format!("error rendering: {e}"), span.start, span.len());
            }
        }
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Value::String(out)
}

fn render_branch(ctx: &Context, map: &Object, env: &Params) -> Value {
    let condition = match map.get("$if") {
        Some(Value::String(text)) => render_interpolation(ctx, text, env),
        Some(other) => other.clone(),
        None => Value::Null,
    };

    if condition.is_truthy() {
        render(ctx, map.get("$then").unwrap_or(&Value::Null), env)
    } else if let Some(alternative) = control_entry(map, "$else") {
        render(ctx, alternative, env)
    } else {
        Value::Null
    }
}

fn render_loop(ctx: &Context, map: &Object, env: &Params) -> Value {
    let source = match map.get("$for") {
        Some(Value::String(text)) => render_interpolation(ctx, text, env),
        Some(other) => other.clone(),
        None => Value::Null,
    };

    let items = match source {
        Value::Null => return Value::Null,
        Value::Array(items) => items,
        other => {
            ctx.add_error(format!(
                "error rendering: $for expression result is not iterable: {}",
                other.to_text()
            ));
            return Value::Null;
        }
    };

    let alias = map
        .get("$as")
        .and_then(Value::as_str)
        .unwrap_or("item")
        .to_owned();
    let loop_name = if alias == "item" {
        "loop".to_owned()
    } else {
        format!("loop_{alias}")
    };
    let body = map.get("$each").unwrap_or(&Value::Null);

    let len = items.len();
    let mut out = Vec::with_capacity(len);
    for (i, item) in items.into_iter().enumerate() {
        let mut scope = env.clone();
        scope.insert(alias.clone(), item);
        scope.insert(loop_name.clone(), loop_record(i, len));
        // Loop items are the sequence; nulls are kept, not dropped.
        out.push(render(&ctx.with_path(i), body, &scope));
    }
    Value::Array(out)
}

fn loop_record(index: usize, len: usize) -> Value {
    let mut record = Object::new();
    record.insert("index".into(), Value::Int(index as i64));
    record.insert("first".into(), Value::Bool(index == 0));
    record.insert("last".into(), Value::Bool(index + 1 == len));
    Value::Object(record)
}

fn render_flatten(ctx: &Context, map: &Object, env: &Params) -> Value {
    let inner = render(
        &ctx.with_path("$flatten"),
        map.get("$flatten").unwrap_or(&Value::Null),
        env,
    );

    let groups = match inner {
        Value::Array(groups) => groups,
        _ => {
            ctx.add_error("error rendering: $flatten result is not iterable");
            return Value::Null;
        }
    };

    let mut out = Vec::new();
    for (i, group) in groups.into_iter().enumerate() {
        match group {
            Value::Array(items) => out.extend(items),
            Value::Null => {}
            other => {
                ctx.with_path("$flatten").with_path(i).add_error(format!(
                    "error rendering: $flatten item is not a sequence, found {}",
                    other.json_type()
                ));
            }
        }
    }
    Value::Array(out)
}

fn render_mapping(ctx: &Context, map: &Object, env: &Params) -> Value {
    let mut out = Object::with_capacity(map.len());
    for (key, value) in map {
        let entry_ctx = ctx.with_path(key);
        let rendered_key = render_interpolation(&entry_ctx, key, env);
        let Value::String(key_text) = rendered_key else {
            entry_ctx.add_error(format!(
                "error rendering: object key must render to a string, found {}",
                rendered_key.json_type()
            ));
            continue;
        };
        let rendered = render(&entry_ctx, value, env);
        if !rendered.is_null() {
            out.insert(key_text, rendered);
        }
    }
    Value::Object(out)
}
