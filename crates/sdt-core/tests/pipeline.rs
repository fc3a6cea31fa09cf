//! End-to-end scenarios through the public document API: load,
//! validate the template, validate input, render, validate output.

use sdt_core::{Document, Params, Value};

fn params(json: serde_json::Value) -> Params {
    match Value::from_json(json) {
        Value::Object(o) => o,
        other => panic!("expected object params, got {other:?}"),
    }
}

fn expect(json: serde_json::Value) -> Value {
    Value::from_json(json)
}

/// Load, statically validate, validate input, render, validate output.
/// Panics on any unexpected diagnostic along the way.
fn run(doc_text: &str, input: serde_json::Value) -> Value {
    let doc = Document::from_bytes("doc.yaml", doc_text.as_bytes()).unwrap();
    let (warnings, errors) = doc.validate_template();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let mut params = params(input);
    doc.validate_input(&mut params).unwrap();

    let (output, errors) = doc.render(&params);
    assert!(errors.is_empty(), "unexpected render errors: {errors:?}");

    doc.validate_output(&output).unwrap();
    output
}

#[test]
fn test_simple_interpolation() {
    let doc = "\
schemas:
  input:
    properties:
      name:
        type: string
  output:
    type: object
    properties:
      greeting:
        type: string
template:
  greeting: Hello, ${name}!
";
    let output = run(doc, serde_json::json!({"name": "Alice"}));
    assert_eq!(output, expect(serde_json::json!({"greeting": "Hello, Alice!"})));
}

#[test]
fn test_typed_single_span() {
    let doc = "\
schemas:
  input:
    properties:
      n:
        type: integer
  output:
    type: object
    properties:
      doubled:
        type: integer
template:
  doubled: ${n * 2}
";
    let output = run(doc, serde_json::json!({"n": 21}));
    assert_eq!(output, expect(serde_json::json!({"doubled": 42})));
}

#[test]
fn test_branch_both_arms_and_dropped_key() {
    let doc = "\
schemas:
  input:
    properties:
      x:
        type: integer
  output:
    type: object
    properties:
      msg:
        type: string
template:
  msg:
    $if: ${x > 0}
    $then: pos
    $else: np
";
    assert_eq!(
        run(doc, serde_json::json!({"x": 5})),
        expect(serde_json::json!({"msg": "pos"}))
    );
    assert_eq!(
        run(doc, serde_json::json!({"x": -1})),
        expect(serde_json::json!({"msg": "np"}))
    );

    let without_else = "\
schemas:
  input:
    properties:
      x:
        type: integer
  output:
    type: object
    properties:
      msg:
        type: string
template:
  msg:
    $if: ${x > 0}
    $then: pos
";
    // False condition without $else renders null; the parent mapping
    // drops the key entirely.
    assert_eq!(
        run(without_else, serde_json::json!({"x": 0})),
        expect(serde_json::json!({}))
    );
}

#[test]
fn test_loop_with_aliasing() {
    let doc = "\
schemas:
  input:
    properties:
      xs:
        type: array
        items:
          type: integer
  output:
    type: object
    properties:
      items:
        type: array
        items:
          type: object
          properties:
            v:
              type: integer
            i:
              type: integer
template:
  items:
    $for: ${xs}
    $as: x
    $each:
      v: ${x}
      i: ${loop_x.index}
";
    let output = run(doc, serde_json::json!({"xs": [10, 20]}));
    assert_eq!(
        output,
        expect(serde_json::json!({
            "items": [{"v": 10, "i": 0}, {"v": 20, "i": 1}]
        }))
    );
}

#[test]
fn test_flatten_groups() {
    let doc = "\
schemas:
  input:
    properties:
      groups:
        type: array
        items:
          type: object
          properties:
            items:
              type: array
              items:
                type: integer
  output:
    type: object
    properties:
      all:
        type: array
        items:
          type: integer
template:
  all:
    $flatten:
      $for: ${groups}
      $as: g
      $each: ${g.items}
";
    let output = run(
        doc,
        serde_json::json!({"groups": [{"items": [1, 2]}, {"items": [3]}]}),
    );
    assert_eq!(output, expect(serde_json::json!({"all": [1, 2, 3]})));
}

#[test]
fn test_static_type_mismatch_reported_at_path() {
    let doc = "\
schemas:
  input:
    properties:
      name:
        type: string
  output:
    type: object
    properties:
      n:
        type: integer
template:
  n: ${name}
";
    let doc = Document::from_bytes("doc.yaml", doc.as_bytes()).unwrap();
    let (warnings, errors) = doc.validate_template();
    assert!(warnings.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].path.ends_with("/template/n"), "path: {}", errors[0].path);
    assert!(errors[0].message.contains("'name'"));
    assert!(errors[0].message.contains("expecting [integer]"));
}

#[test]
fn test_empty_loop_source_yields_empty_sequence() {
    let doc = "\
schemas:
  input:
    properties:
      xs:
        type: array
        items:
          type: integer
  output:
    type: object
    properties:
      items:
        type: array
        items:
          type: integer
template:
  items:
    $for: ${xs}
    $each: ${item}
";
    let output = run(doc, serde_json::json!({"xs": []}));
    assert_eq!(output, expect(serde_json::json!({"items": []})));
}

#[test]
fn test_defaults_filled_and_idempotent() {
    let doc = "\
schemas:
  input:
    properties:
      name:
        type: string
        default: world
      n:
        type: integer
        default: 3
  output:
    type: object
    properties:
      greeting:
        type: string
template:
  greeting: Hello, ${name} (${n})
";
    let doc = Document::from_bytes("doc.yaml", doc.as_bytes()).unwrap();

    let mut p = params(serde_json::json!({}));
    doc.validate_input(&mut p).unwrap();
    assert_eq!(p["name"], Value::String("world".into()));
    assert_eq!(p["n"], Value::Int(3));

    // Defaults are filled after validation succeeded; re-validating
    // the same mapping is a no-op.
    let snapshot = p.clone();
    doc.validate_input(&mut p).unwrap();
    assert_eq!(p, snapshot);

    let (output, errors) = doc.render(&p);
    assert!(errors.is_empty());
    assert_eq!(
        output,
        expect(serde_json::json!({"greeting": "Hello, world (3)"}))
    );
}

#[test]
fn test_input_validation_rejects_wrong_types() {
    let doc = "\
schemas:
  input:
    properties:
      n:
        type: integer
  output:
    type: object
template:
  n: ${n}
";
    let doc = Document::from_bytes("doc.yaml", doc.as_bytes()).unwrap();
    let mut p = params(serde_json::json!({"n": "not a number"}));
    let err = doc.validate_input(&mut p).unwrap_err();
    assert!(err.to_string().contains("error validating params"));
}

#[test]
fn test_output_validation_catches_schema_breaks() {
    // The output schema requires a key the template never produces.
    let doc = "\
schemas:
  input:
    properties:
      x:
        type: integer
  output:
    type: object
    required: [always]
    properties:
      always:
        type: string
      maybe:
        type: string
template:
  maybe:
    $if: ${x > 0}
    $then: yes!
";
    let doc = Document::from_bytes("doc.yaml", doc.as_bytes()).unwrap();
    let mut p = params(serde_json::json!({"x": 0}));
    doc.validate_input(&mut p).unwrap();
    let (output, errors) = doc.render(&p);
    assert!(errors.is_empty());
    let err = doc.validate_output(&output).unwrap_err();
    assert!(err.to_string().contains("error validating output"));
}

#[test]
fn test_render_collects_errors_and_continues() {
    let doc = "\
schemas:
  input:
    properties:
      name:
        type: string
template:
  good: ${name}
  bad: ${name.nope}
  also_good: still ${name}
";
    let doc = Document::from_bytes("doc.yaml", doc.as_bytes()).unwrap();
    let p = params(serde_json::json!({"name": "Alice"}));
    let (output, errors) = doc.render(&p);

    assert_eq!(errors.len(), 1);
    assert!(errors[0].path.ends_with("/template/bad"));

    // Failed subtree yields null and is dropped; siblings rendered.
    let object = output.as_object().unwrap();
    assert_eq!(object["good"], Value::String("Alice".into()));
    assert!(!object.contains_key("bad"));
    assert_eq!(object["also_good"], Value::String("still Alice".into()));
}

#[test]
fn test_nested_loops_flattened() {
    let doc = "\
schemas:
  input:
    properties:
      rows:
        type: array
        items:
          type: array
          items:
            type: integer
  output:
    type: object
    properties:
      cells:
        type: array
        items:
          type: integer
template:
  cells:
    $flatten:
      $for: ${rows}
      $as: row
      $each:
        $for: ${row}
        $as: cell
        $each: ${cell * 10}
";
    let output = run(doc, serde_json::json!({"rows": [[1, 2], [3]]}));
    assert_eq!(output, expect(serde_json::json!({"cells": [10, 20, 30]})));
}
