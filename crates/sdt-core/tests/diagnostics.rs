//! Diagnostic behavior across the document API: ordering, source
//! locations, machine shape, determinism, and the complexity warning.

use sdt_core::{Document, Params, Value};

fn doc(text: &str) -> Document {
    Document::from_bytes("doc.yaml", text.as_bytes()).unwrap()
}

#[test]
fn test_diagnostics_emitted_in_template_preorder() {
    let d = doc("\
schemas:
  input:
    properties:
      name:
        type: string
  output:
    type: object
    properties:
      a:
        type: integer
      b:
        type: object
        properties:
          inner:
            type: integer
      c:
        type: integer
template:
  a: ${name}
  b:
    inner: ${name}
  c: ${name}
");
    let (_, errors) = d.validate_template();
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "doc.yaml#/template/a",
            "doc.yaml#/template/b/inner",
            "doc.yaml#/template/c",
        ]
    );
}

#[test]
fn test_validate_template_is_deterministic() {
    let d = doc("\
schemas:
  input:
    properties:
      name:
        type: string
  output:
    type: object
    properties:
      a:
        type: integer
      b:
        type: integer
template:
  a: ${name}
  b: ${name}
");
    let first = d.validate_template();
    let second = d.validate_template();
    assert_eq!(first, second);
}

#[test]
fn test_diagnostic_carries_source_location() {
    let d = doc("\
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
  greeting: Hello, ${nam}!
");
    let (_, errors) = d.validate_template();
    assert_eq!(errors.len(), 1);
    let e = &errors[0];
    assert_eq!(e.path, "doc.yaml#/template/greeting");
    // The template value sits on the last line of the document; the
    // location points into the ${nam} span within it.
    assert_eq!(e.line, 12);
    assert!(e.column > 1);
    assert!(e.offset > 0);
    assert_eq!(e.length, "${nam}".len());
    let display = e.to_string();
    assert!(display.contains("Hello, ${nam}!"));
    assert!(display.contains("^^^^^^"));
}

#[test]
fn test_loop_index_paths_fall_back_to_zero_location() {
    // Render-time loop paths include element indices that do not
    // exist in the source tree; those diagnostics still carry the
    // right path but zero location fields.
    let d = doc("\
schemas:
  input:
    properties:
      xs:
        type: array
        items:
          type: integer
template:
  out:
    $for: ${xs}
    $each: ${item.nope}
");
    let mut params = Params::new();
    params.insert("xs".into(), Value::Array(vec![Value::Int(1)]));
    let (output, errors) = d.render(&params);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "doc.yaml#/template/out/0");
    assert_eq!(errors[0].line, 0);
    assert_eq!(errors[0].offset, 0);
    // The failed item renders null; $for keeps null items.
    assert_eq!(
        output.as_object().unwrap()["out"],
        Value::Array(vec![Value::Null])
    );
}

#[test]
fn test_diagnostic_machine_shape() {
    let d = doc("\
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
");
    let (_, errors) = d.validate_template();
    let json = serde_json::to_value(&errors[0]).unwrap();
    let object = json.as_object().unwrap();
    for field in ["path", "offset", "line", "column", "length", "message"] {
        assert!(object.contains_key(field), "missing field {field}");
    }
    assert_eq!(object.len(), 6);
}

#[test]
fn test_complexity_warning_over_threshold() {
    let spans = "${name}".repeat(51);
    let text = format!(
        "\
schemas:
  input:
    properties:
      name:
        type: string
  output:
    type: object
    properties:
      big:
        type: string
template:
  big: \"{spans}\"
"
    );
    let d = doc(&text);
    let (warnings, errors) = d.validate_template();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("template complexity is high: 51"));
}

#[test]
fn test_under_threshold_has_no_warning() {
    let d = doc("\
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
");
    let (warnings, errors) = d.validate_template();
    assert!(warnings.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_render_error_offsets_point_into_spans() {
    let d = doc("\
schemas:
  input:
    properties:
      name:
        type: string
template:
  line: before ${name.missing} after
");
    let mut params = Params::new();
    params.insert("name".into(), Value::String("x".into()));
    let (output, errors) = d.render(&params);
    assert_eq!(errors.len(), 1);
    let e = &errors[0];
    assert_eq!(e.path, "doc.yaml#/template/line");
    // The span starts after "before ", 8 bytes into the scalar.
    assert_eq!(e.length, "${name.missing}".len());
    assert!(e.column > 8);
    // Failed span substitutes the empty string in multi-span mode.
    assert_eq!(
        output.as_object().unwrap()["line"],
        Value::String("before  after".into())
    );
}
