//! # Diagnostics — Paths, Records, Source Locations
//!
//! Rendering and validation never abort on data errors; they collect
//! [`Diagnostic`] records into a shared sink and keep going. A
//! [`Context`] carries the filename, the slash-delimited path of the
//! node being visited, and the shared sink; `with_path` derives a child
//! context so recursion extends the path naturally.
//!
//! When the document source was retained, diagnostics are resolved
//! against a [`SourceMap`] to a concrete byte offset, line, column and
//! length, plus an excerpt of the offending line with a caret marker.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use marked_yaml::Node;
use serde::Serialize;

/// Complexity score above which `validate_template` emits a warning.
pub const COMPLEXITY_WARN_THRESHOLD: u32 = 50;

/// A machine-readable, optionally source-located error or warning.
///
/// `offset`, `line`, `column` and `length` are zero when no parsed
/// source was available to resolve the path against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Slash-delimited trail from the document root, prefixed with the
    /// filename when one was given (`doc.yaml#/template/items/0`).
    pub path: String,
    /// Byte offset into the source document.
    pub offset: usize,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub column: usize,
    /// Length in bytes of the offending span.
    pub length: usize,
    pub message: String,
    #[serde(skip)]
    excerpt: Option<String>,
}

impl Diagnostic {
    /// A diagnostic with no source location.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            path: path.into(),
            offset: 0,
            line: 0,
            column: 0,
            length: 0,
            message: message.into(),
            excerpt: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n{excerpt}")?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Meta {
    diagnostics: Vec<Diagnostic>,
    complexity: u32,
}

/// Shared recursion state for rendering and validation.
///
/// Cloning via [`Context::with_path`] shares the diagnostic sink and
/// complexity counter while extending the path, so sibling subtrees can
/// be visited with independent paths but one collected result. Each
/// document operation builds a fresh context, which is what keeps a
/// loaded document shareable across threads.
#[derive(Clone)]
pub(crate) struct Context<'d> {
    filename: &'d str,
    path: String,
    source: Option<&'d SourceMap>,
    meta: Rc<RefCell<Meta>>,
}

impl<'d> Context<'d> {
    pub(crate) fn new(filename: &'d str, source: Option<&'d SourceMap>, root: &str) -> Self {
        Context {
            filename,
            path: format!("/{root}"),
            source,
            meta: Rc::new(RefCell::new(Meta::default())),
        }
    }

    /// A child context with `segment` appended to the path.
    pub(crate) fn with_path(&self, segment: impl fmt::Display) -> Self {
        Context {
            filename: self.filename,
            path: format!("{}/{segment}", self.path.trim_end_matches('/')),
            source: self.source,
            meta: Rc::clone(&self.meta),
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// The path qualified with the filename, matching the `path` field
    /// of emitted diagnostics.
    pub(crate) fn full_path(&self) -> String {
        if self.filename.is_empty() {
            self.path.clone()
        } else if self.filename.contains('#') {
            format!("{}{}", self.filename, self.path)
        } else {
            format!("{}#{}", self.filename, self.path)
        }
    }

    /// Record an error at the current path.
    pub(crate) fn add_error(&self, message: impl Into<String>) {
        self.add_error_offset(message, 0, 0);
    }

    /// Record an error at the current path, shifted `extra` bytes into
    /// the located node (used to point inside interpolation spans).
    /// A non-zero `length` overrides the located node's own length.
    pub(crate) fn add_error_offset(&self, message: impl Into<String>, extra: usize, length: usize) {
        let mut diagnostic = Diagnostic::new(self.full_path(), message);
        if let Some(map) = self.source {
            if let Some(location) = map.locate(&self.path) {
                diagnostic.offset = location.offset + extra;
                diagnostic.line = location.line;
                diagnostic.column = location.column + extra;
                diagnostic.length = if length > 0 { length } else { location.length };
                diagnostic.excerpt =
                    map.excerpt(diagnostic.line, diagnostic.column, diagnostic.length);
            }
        }
        self.meta.borrow_mut().diagnostics.push(diagnostic);
    }

    /// Charge one unit of template complexity.
    pub(crate) fn bump_complexity(&self) {
        self.meta.borrow_mut().complexity += 1;
    }

    /// Drain the collected diagnostics and the complexity total.
    pub(crate) fn finish(self) -> (Vec<Diagnostic>, u32) {
        let mut meta = self.meta.borrow_mut();
        (std::mem::take(&mut meta.diagnostics), meta.complexity)
    }
}

pub(crate) struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

/// Span-preserving view of the document source, used to resolve
/// template paths to source locations. Built once at document load and
/// consulted only when a diagnostic is recorded.
#[derive(Debug)]
pub struct SourceMap {
    text: String,
    root: Node,
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Parse `text` keeping markers. Returns `None` when the source
    /// cannot be re-parsed with spans; diagnostics then carry zero
    /// locations, which callers must tolerate anyway.
    pub fn parse(text: &str) -> Option<SourceMap> {
        let root = marked_yaml::parse_yaml(0, text).ok()?;
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Some(SourceMap {
            text: text.to_owned(),
            root,
            line_starts,
        })
    }

    /// Resolve a slash-delimited path to the location of its node.
    ///
    /// Paths may contain segments that exist only in the rendered tree
    /// (loop indices under a `$for` mapping, for instance); those fail
    /// to resolve and the diagnostic is emitted without a location.
    pub(crate) fn locate(&self, path: &str) -> Option<Location> {
        let mut node = &self.root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = match node {
                Node::Mapping(map) => map
                    .iter()
                    .find(|(key, _)| key.as_str() == segment)
                    .map(|(_, value)| value)?,
                Node::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
                Node::Scalar(_) => return None,
            };
        }

        let (marker, length) = match node {
            Node::Mapping(map) => (map.span().start()?, 1),
            Node::Sequence(seq) => (seq.span().start()?, 1),
            Node::Scalar(scalar) => (scalar.span().start()?, scalar.as_str().len().max(1)),
        };
        let line = marker.line();
        let column = marker.column();
        let offset = self.line_starts.get(line.checked_sub(1)?)? + column.saturating_sub(1);
        Some(Location {
            offset,
            line,
            column,
            length,
        })
    }

    /// Render the source line with a caret run under the span.
    pub(crate) fn excerpt(&self, line: usize, column: usize, length: usize) -> Option<String> {
        let text = self.text.lines().nth(line.checked_sub(1)?)?;
        let indent = column.saturating_sub(1);
        let width = length.max(1).min(text.len().saturating_sub(indent).max(1));
        Some(format!(
            "{line:4} | {text}\n     | {}{}",
            " ".repeat(indent),
            "^".repeat(width),
        ))
    }
}
