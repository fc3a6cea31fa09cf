//! # Document Façade
//!
//! A [`Document`] bundles the input schema, the output schema and the
//! template, and orchestrates the pipeline:
//! load → validate-template → validate-input → render → validate-output.
//!
//! ## Strict Inputs
//!
//! The input schema is implicitly an object schema, and unless the
//! author says otherwise it gets `additionalProperties: false`: params
//! are user-facing surface and typos should fail loudly.
//!
//! ## Thread Safety
//!
//! Documents are immutable after load except for lazy schema
//! compilation, which is memoized in `OnceLock`s. Run any validation
//! once to force compilation, then a document can be shared freely.
//! `validate_input` fills defaults into its params argument in place,
//! so a single params mapping must not be shared across threads.

use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::Deserialize;
use serde_json::Value as Json;

use crate::defaults;
use crate::diag::{Context, Diagnostic, SourceMap, COMPLEXITY_WARN_THRESHOLD};
use crate::error::{Error, SchemaKind, Violation, Violations};
use crate::example;
use crate::schema::{self, SchemaView};
use crate::validate;
use crate::value::{Params, Value};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    schemas: Option<RawSchemas>,
    #[serde(default)]
    template: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawSchemas {
    #[serde(default)]
    dialect: Option<String>,
    #[serde(default)]
    input: Option<serde_yaml::Value>,
    #[serde(default)]
    output: Option<serde_yaml::Value>,
}

/// A structured data template document.
#[derive(Debug)]
pub struct Document {
    filename: String,
    dialect: Option<String>,
    input_schema: Option<Json>,
    output_schema: Option<Json>,
    template: Value,
    source: Option<SourceMap>,
    compiled_input: OnceLock<Result<Validator, String>>,
    compiled_output: OnceLock<Result<Validator, String>>,
}

impl Document {
    /// Load a document from a file. The filename becomes the prefix of
    /// diagnostic paths.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Document, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(path.display().to_string(), &bytes)
    }

    /// Load a document from raw YAML or JSON bytes (YAML being the
    /// superset path). The source is retained in span-preserving form
    /// when possible so diagnostics can point into it.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Result<Document, Error> {
        let filename = filename.into();
        let raw: RawDocument =
            serde_yaml::from_slice(bytes).map_err(|e| Error::DocumentParse {
                filename: filename.clone(),
                source: e,
            })?;

        let text = String::from_utf8_lossy(bytes);
        let source = SourceMap::parse(&text);

        let (dialect, input_schema, output_schema) = match raw.schemas {
            Some(schemas) => (
                schemas.dialect,
                schemas
                    .input
                    .map(schema::yaml_to_json)
                    .map(strict_input_schema),
                schemas.output.map(schema::yaml_to_json),
            ),
            None => (None, None, None),
        };

        tracing::debug!(filename = %filename, "loaded document");
        Ok(Document {
            filename,
            dialect,
            input_schema,
            output_schema,
            template: raw.template.unwrap_or(Value::Null),
            source,
            compiled_input: OnceLock::new(),
            compiled_output: OnceLock::new(),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    fn input_validator(&self) -> Result<Option<&Validator>, Error> {
        let Some(schema) = &self.input_schema else {
            return Ok(None);
        };
        self.compiled_input
            .get_or_init(|| schema::compile(self.dialect.as_deref(), schema))
            .as_ref()
            .map(Some)
            .map_err(|reason| Error::SchemaCompile {
                kind: SchemaKind::Input,
                reason: reason.clone(),
            })
    }

    fn output_validator(&self) -> Result<Option<&Validator>, Error> {
        let Some(schema) = &self.output_schema else {
            return Ok(None);
        };
        self.compiled_output
            .get_or_init(|| schema::compile(self.dialect.as_deref(), schema))
            .as_ref()
            .map(Some)
            .map_err(|reason| Error::SchemaCompile {
                kind: SchemaKind::Output,
                reason: reason.clone(),
            })
    }

    /// Generate a representative example of the input params, or
    /// `None` when the document declares no input schema.
    pub fn example(&self) -> Result<Option<Value>, Error> {
        match &self.input_schema {
            None => Ok(None),
            Some(schema) => Ok(Some(example::generate(SchemaView::new(schema))?)),
        }
    }

    /// Statically check the template against the schemas.
    ///
    /// Returns `(warnings, errors)`. A one-time cost per document:
    /// every embedded expression is compiled and evaluated against an
    /// example synthesized from the input schema, and the template
    /// structure is matched against the output schema. Also forces and
    /// memoizes schema compilation.
    pub fn validate_template(&self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        let ctx = Context::new(&self.filename, self.source.as_ref(), "template");
        let root_path = ctx.full_path();

        let Some(input) = &self.input_schema else {
            return (
                Vec::new(),
                vec![Diagnostic::new(root_path, "input schema required")],
            );
        };

        let mut compile_errors = Vec::new();
        if let Err(e) = self.input_validator() {
            compile_errors.push(Diagnostic::new(root_path.clone(), e.to_string()));
        }
        if let Err(e) = self.output_validator() {
            compile_errors.push(Diagnostic::new(root_path.clone(), e.to_string()));
        }
        if !compile_errors.is_empty() {
            return (Vec::new(), compile_errors);
        }

        let Some(output) = &self.output_schema else {
            return (Vec::new(), Vec::new());
        };

        let example = match example::generate(SchemaView::new(input)) {
            Ok(example) => example,
            Err(e) => {
                return (
                    Vec::new(),
                    vec![Diagnostic::new(
                        root_path,
                        format!("error validating template: {e}"),
                    )],
                );
            }
        };
        let Value::Object(example) = example else {
            return (
                Vec::new(),
                vec![Diagnostic::new(
                    root_path,
                    "error validating template: input schema example must be an object",
                )],
            );
        };

        validate::validate_template(&ctx, SchemaView::new(output), &self.template, &example);
        let (errors, complexity) = ctx.finish();

        let mut warnings = Vec::new();
        if complexity > COMPLEXITY_WARN_THRESHOLD {
            warnings.push(Diagnostic::new(
                root_path,
                format!("template complexity is high: {complexity}"),
            ));
        }
        (warnings, errors)
    }

    /// Validate params against the input schema and, on success, fill
    /// declared defaults into them in place. A no-op without an input
    /// schema.
    pub fn validate_input(&self, params: &mut Params) -> Result<(), Error> {
        let Some(validator) = self.input_validator()? else {
            return Ok(());
        };

        let instance = serde_json::to_value(&*params)?;
        let violations: Vec<Violation> = validator
            .iter_errors(&instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if !violations.is_empty() {
            return Err(Error::InputValidation {
                violations: Violations(violations),
            });
        }

        if let Some(schema) = &self.input_schema {
            defaults::fill_defaults(SchemaView::new(schema), params);
        }
        Ok(())
    }

    /// Render the template with the given params.
    ///
    /// Never fails outright on data errors: diagnostics are collected
    /// at the offending paths, the affected subtrees yield null, and
    /// the rest of the template still renders. Params are expected to
    /// have gone through [`Document::validate_input`] first; without
    /// that, missing-key lookups surface as expression diagnostics.
    pub fn render(&self, params: &Params) -> (Value, Vec<Diagnostic>) {
        let ctx = Context::new(&self.filename, self.source.as_ref(), "template");
        let rendered = crate::render::render(&ctx, &self.template, params);
        let (diagnostics, _) = ctx.finish();
        (rendered, diagnostics)
    }

    /// Validate a rendered value against the output schema. A no-op
    /// without an output schema.
    pub fn validate_output(&self, output: &Value) -> Result<(), Error> {
        let Some(validator) = self.output_validator()? else {
            return Ok(());
        };

        let instance = output.to_json();
        let violations: Vec<Violation> = validator
            .iter_errors(&instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::OutputValidation {
                violations: Violations(violations),
            })
        }
    }
}

/// Inputs are strict by default: force object type and, unless the
/// author opted out, refuse undeclared params.
fn strict_input_schema(mut schema: Json) -> Json {
    if let Json::Object(map) = &mut schema {
        map.insert("type".into(), Json::String("object".into()));
        map.entry("additionalProperties")
            .or_insert(Json::Bool(false));
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
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

    #[test]
    fn test_from_bytes_parses_sections() {
        let doc = Document::from_bytes("doc.yaml", DOC.as_bytes()).unwrap();
        assert_eq!(doc.filename(), "doc.yaml");
        assert!(doc.input_schema.is_some());
        assert!(doc.output_schema.is_some());
        assert!(doc.template().as_object().is_some());
    }

    #[test]
    fn test_input_schema_made_strict() {
        let doc = Document::from_bytes("doc.yaml", DOC.as_bytes()).unwrap();
        let input = doc.input_schema.as_ref().unwrap();
        assert_eq!(input["type"], "object");
        assert_eq!(input["additionalProperties"], false);
    }

    #[test]
    fn test_author_can_relax_additional_properties() {
        let text = "\
schemas:
  input:
    additionalProperties: true
    properties: {}
template: ok
";
        let doc = Document::from_bytes("doc.yaml", text.as_bytes()).unwrap();
        assert_eq!(doc.input_schema.as_ref().unwrap()["additionalProperties"], true);
    }

    #[test]
    fn test_invalid_yaml_is_a_load_error() {
        let err = Document::from_bytes("doc.yaml", b"{unclosed").unwrap_err();
        assert!(matches!(err, Error::DocumentParse { .. }));
    }

    #[test]
    fn test_example_without_input_schema_is_none() {
        let doc = Document::from_bytes("doc.yaml", b"template: hi").unwrap();
        assert_eq!(doc.example().unwrap(), None);
    }

    #[test]
    fn test_validate_template_requires_input_schema() {
        let doc = Document::from_bytes("doc.yaml", b"template: hi").unwrap();
        let (warnings, errors) = doc.validate_template();
        assert!(warnings.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("input schema required"));
    }

    #[test]
    fn test_validate_template_without_output_schema_passes() {
        let text = "\
schemas:
  input:
    properties: {}
template: anything ${goes}
";
        let doc = Document::from_bytes("doc.yaml", text.as_bytes()).unwrap();
        let (warnings, errors) = doc.validate_template();
        assert!(warnings.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_input_rejects_undeclared_params() {
        let doc = Document::from_bytes("doc.yaml", DOC.as_bytes()).unwrap();
        let mut params = Params::new();
        params.insert("surprise".into(), Value::Int(1));
        let err = doc.validate_input(&mut params).unwrap_err();
        assert!(matches!(err, Error::InputValidation { .. }));
    }

    #[test]
    fn test_validate_input_without_schema_is_noop() {
        let doc = Document::from_bytes("doc.yaml", b"template: hi").unwrap();
        let mut params = Params::new();
        params.insert("anything".into(), Value::Int(1));
        assert!(doc.validate_input(&mut params).is_ok());
    }

    #[test]
    fn test_bad_schema_surfaces_as_compile_error() {
        let text = "\
schemas:
  input:
    properties:
      x:
        type: 12
  output:
    type: object
template: {}
";
        let doc = Document::from_bytes("doc.yaml", text.as_bytes()).unwrap();
        let (_, errors) = doc.validate_template();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("input schema"));
    }
}
