//! # sdt-core — Structured Data Templates
//!
//! Templates are data trees: an input schema describes the params, an
//! output schema describes the result, and the template in between is
//! plain YAML/JSON with three control operators (`$if`, `$for`,
//! `$flatten`) and `${…}` expression interpolation in strings.
//!
//! The crate implements a two-pass pipeline over that data:
//!
//! 1. **Static validation** ([`Document::validate_template`]) walks
//!    the template against the output schema once per document,
//!    type-checking every expression against an example value
//!    synthesized from the input schema — type mismatches are caught
//!    before any params arrive.
//! 2. **Rendering** ([`Document::render`]) evaluates the same tree
//!    against real params, collecting source-located diagnostics
//!    instead of aborting.
//!
//! ```
//! use sdt_core::{Document, Params, Value};
//!
//! let doc = Document::from_bytes("greeting.yaml", b"\
//! schemas:
//!   input:
//!     properties:
//!       name:
//!         type: string
//!   output:
//!     type: object
//!     properties:
//!       greeting:
//!         type: string
//! template:
//!   greeting: Hello, ${name}!
//! ").unwrap();
//!
//! let (warnings, errors) = doc.validate_template();
//! assert!(warnings.is_empty() && errors.is_empty());
//!
//! let mut params = Params::new();
//! params.insert("name".into(), Value::String("Alice".into()));
//! doc.validate_input(&mut params).unwrap();
//!
//! let (output, errors) = doc.render(&params);
//! assert!(errors.is_empty());
//! assert_eq!(
//!     output.as_object().unwrap()["greeting"],
//!     Value::String("Hello, Alice!".into()),
//! );
//! ```

pub mod diag;
pub mod document;
pub mod error;
pub mod value;

mod defaults;
mod example;
mod expr;
mod render;
mod schema;
mod validate;

pub use diag::{Diagnostic, SourceMap};
pub use document::Document;
pub use error::{Error, ExampleError, SchemaKind, Violation, Violations};
pub use value::{Object, Params, Value};
