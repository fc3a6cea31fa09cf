//! # Error Types — Structured Error Hierarchy
//!
//! Fatal failures (load, schema compilation, instance validation) are
//! surfaced through [`Error`]. Collected, non-fatal problems found while
//! walking a template travel as [`crate::diag::Diagnostic`] lists
//! instead; see the module docs of `diag`.
//!
//! Instance validation failures carry a structured [`Violations`] list
//! with the instance path and message for each individual violation.

use std::fmt;

use thiserror::Error;

/// Top-level error type for document operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error reading a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The document bytes could not be parsed as YAML/JSON.
    #[error("error parsing document '{filename}': {source}")]
    DocumentParse {
        /// Logical filename the bytes were loaded under.
        filename: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A declared schema could not be compiled.
    #[error("error compiling {kind} schema: {reason}")]
    SchemaCompile {
        /// Which of the document's schemas failed.
        kind: SchemaKind,
        /// Reason reported by the schema compiler.
        reason: String,
    },

    /// Params did not conform to the input schema.
    #[error("error validating params against schema:\n{violations}")]
    InputValidation {
        /// Structured list of individual violations.
        violations: Violations,
    },

    /// Rendered output did not conform to the output schema.
    #[error("error validating output against schema:\n{violations}")]
    OutputValidation {
        /// Structured list of individual violations.
        violations: Violations,
    },

    /// Example generation is not possible for the input schema.
    #[error("error generating example: {0}")]
    Example(#[from] ExampleError),

    /// Value serialization failed on the way into schema validation.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which of a document's two schemas an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Input,
    Output,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaKind::Input => "input",
            SchemaKind::Output => "output",
        })
    }
}

/// Reasons the example generator can refuse a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExampleError {
    /// The generator needs a single concrete type per schema node.
    #[error("schemas with multiple types are not supported")]
    MultipleTypes,

    /// Free-form objects have no known field set to type-check against.
    #[error("additionalProperties schemas are not supported")]
    AdditionalProperties,
}

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of schema violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub(crate) Vec<Violation>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            message: r#""name" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_violations_display_joins_lines() {
        let vs = Violations(vec![
            Violation {
                instance_path: "/a".into(),
                message: "first".into(),
            },
            Violation {
                instance_path: "/b".into(),
                message: "second".into(),
            },
        ]);
        assert_eq!(vs.to_string(), "  /a: first\n  /b: second");
    }
}
