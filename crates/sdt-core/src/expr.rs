//! # Expression Bridge
//!
//! Thin, stateless adapter over the embedded expression language.
//! Exposes exactly two operations: [`parse`] (syntax check, used by the
//! template validator) and [`eval`] (used by the validator against the
//! synthesized example and by the renderer against real params).
//!
//! Expressions are minijinja expressions evaluated with strict
//! undefined behavior, so a reference to a name or attribute that does
//! not exist in the environment fails instead of producing an
//! undefined value. That strictness is what lets example-evaluation
//! double as a static type check.
//!
//! Also home to the `${…}` span scanner shared by both traversals.

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

use crate::value::{Params, Value};

/// Failure from expression parsing or evaluation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExprError {
    pub message: String,
}

impl ExprError {
    fn from_minijinja(err: minijinja::Error) -> Self {
        ExprError {
            message: err.to_string(),
        }
    }
}

/// A `${…}` interpolation span within a template string. `start..end`
/// covers the whole span including the delimiters; `expr` is the inner
/// expression source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span<'a> {
    pub start: usize,
    pub end: usize,
    pub expr: &'a str,
}

impl Span<'_> {
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Extract all interpolation spans. A span opens at `${` and closes at
/// the next `}`; nesting is not supported and an unclosed opener is
/// treated as plain text.
pub(crate) fn find_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find("${") {
        let start = cursor + found;
        let Some(close) = text[start + 2..].find('}') else {
            break;
        };
        let end = start + 2 + close + 1;
        spans.push(Span {
            start,
            end,
            expr: &text[start + 2..end - 1],
        });
        cursor = end;
    }
    spans
}

/// True when the whole string is one interpolation span, which makes
/// the expression's native result type the node's value.
pub(crate) fn is_single_span(text: &str, spans: &[Span]) -> bool {
    spans.len() == 1 && spans[0].start == 0 && spans[0].end == text.len()
}

fn engine<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

/// Syntax-check an expression without evaluating it.
pub(crate) fn parse(source: &str) -> Result<(), ExprError> {
    engine()
        .compile_expression(source)
        .map(|_| ())
        .map_err(ExprError::from_minijinja)
}

/// Evaluate an expression against an environment of values.
pub(crate) fn eval(source: &str, scope: &Params) -> Result<Value, ExprError> {
    let env = engine();
    let expression = env
        .compile_expression(source)
        .map_err(ExprError::from_minijinja)?;
    let result = expression
        .eval(minijinja::Value::from_serialize(scope))
        .map_err(ExprError::from_minijinja)?;
    let json = serde_json::to_value(&result).map_err(|e| ExprError {
        message: e.to_string(),
    })?;
    Ok(Value::from_json(json))
}
