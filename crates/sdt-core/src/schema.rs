//! # Schema Façade
//!
//! Two views of the same schema material. For instance validation the
//! raw schema value is compiled into a `jsonschema::Validator` with the
//! document's dialect as the default draft. For the template validator,
//! the example generator and the defaults filler, [`SchemaView`] gives a
//! read-only traversal of the raw value: declared types, `$ref`
//! following, properties, item schemas across dialects, defaults,
//! examples and enums. The compiled validator exposes none of that, so
//! the façade walks the value tree itself.

use jsonschema::{Draft, Validator};
use serde_json::Value as Json;

/// Maximum `$ref` indirections followed before giving up. Guards
/// against reference cycles in hand-written schemas.
const MAX_REF_DEPTH: usize = 32;

/// Map a declared dialect to the draft used when a schema carries no
/// explicit `$schema`. Unknown dialects fall back to the compiler
/// default.
pub(crate) fn draft_for_dialect(dialect: &str) -> Option<Draft> {
    let mut url = dialect.trim();
    let https;
    if let Some(rest) = url.strip_prefix("http://") {
        https = format!("https://{rest}");
        url = &https;
    }
    let url = url.trim_end_matches("#/").trim_end_matches('#');
    match url {
        "https://json-schema.org/schema" => Some(Draft::Draft202012),
        "https://json-schema.org/draft/2020-12/schema" => Some(Draft::Draft202012),
        "https://json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
        "https://json-schema.org/draft-07/schema" => Some(Draft::Draft7),
        "https://json-schema.org/draft-06/schema" => Some(Draft::Draft6),
        "https://json-schema.org/draft-04/schema" => Some(Draft::Draft4),
        // OpenAPI 3.0 schemas are an extended subset of draft-04.
        "openapi-3.0" => Some(Draft::Draft4),
        "openapi-3.1" => Some(Draft::Draft202012),
        _ => None,
    }
}

/// Compile a schema value into a validator. The error is carried as a
/// string so the result can be memoized inside the document.
pub(crate) fn compile(dialect: Option<&str>, schema: &Json) -> Result<Validator, String> {
    let mut opts = jsonschema::options();
    if let Some(draft) = dialect.and_then(draft_for_dialect) {
        opts.with_draft(draft);
    }
    opts.build(schema).map_err(|e| e.to_string())
}

/// Convert a `serde_yaml::Value` into a `serde_json::Value`.
///
/// Schema material may arrive as YAML; converting up front lets the
/// rest of the crate treat schemas uniformly. YAML-only constructs
/// (tags, non-string keys) are reduced to their JSON projections.
pub(crate) fn yaml_to_json(yaml: serde_yaml::Value) -> Json {
    match yaml {
        serde_yaml::Value::Null => Json::Null,
        serde_yaml::Value::Bool(b) => Json::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Json::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Json::Number)
                    .unwrap_or(Json::Null)
            }
        }
        serde_yaml::Value::String(s) => Json::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Json::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => format!("{other:?}"),
                };
                obj.insert(key, yaml_to_json(v));
            }
            Json::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// What a schema says about properties beyond the declared set.
pub(crate) enum Additional<'a> {
    /// No `additionalProperties` keyword present.
    Unset,
    /// The literal boolean form.
    Allowed(bool),
    /// A schema that variable-named properties must match.
    Schema(SchemaView<'a>),
}

/// Read-only façade over a raw JSON Schema subtree.
///
/// `root` is the schema the view was created from and anchors local
/// `$ref` resolution; `node` is the subtree this view describes.
#[derive(Clone, Copy)]
pub(crate) struct SchemaView<'a> {
    root: &'a Json,
    node: &'a Json,
}

impl<'a> SchemaView<'a> {
    pub(crate) fn new(root: &'a Json) -> Self {
        SchemaView { root, node: root }
    }

    pub(crate) fn with(root: &'a Json, node: &'a Json) -> Self {
        SchemaView { root, node }
    }

    pub(crate) fn root(&self) -> &'a Json {
        self.root
    }

    pub(crate) fn raw(&self) -> &'a Json {
        self.node
    }

    fn at(&self, node: &'a Json) -> Self {
        SchemaView {
            root: self.root,
            node,
        }
    }

    /// Follow `$ref` chains to the referenced subtree. Only local
    /// (`#/...`) references are resolvable; anything else, or a broken
    /// pointer, leaves the view at the node carrying the reference.
    pub(crate) fn resolve(&self) -> Self {
        let mut view = *self;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = view.node.get("$ref").and_then(Json::as_str) else {
                return view;
            };
            let Some(pointer) = reference.strip_prefix('#') else {
                return view;
            };
            match view.root.pointer(pointer) {
                Some(target) => view = view.at(target),
                None => return view,
            }
        }
        view
    }

    /// Declared types: one for `type: string`, several for the array
    /// form, none when the keyword is absent.
    pub(crate) fn types(&self) -> Vec<&'a str> {
        match self.node.get("type") {
            Some(Json::String(t)) => vec![t.as_str()],
            Some(Json::Array(ts)) => ts.iter().filter_map(Json::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn has_type(&self, t: &str) -> bool {
        self.types().contains(&t)
    }

    pub(crate) fn properties(&self) -> Option<&'a serde_json::Map<String, Json>> {
        self.node.get("properties").and_then(Json::as_object)
    }

    pub(crate) fn property(&self, key: &str) -> Option<Self> {
        Some(self.at(self.properties()?.get(key)?))
    }

    /// All declared property names, sorted for stable messages.
    pub(crate) fn property_names(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = self
            .properties()
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub(crate) fn additional_properties(&self) -> Additional<'a> {
        match self.node.get("additionalProperties") {
            None => Additional::Unset,
            Some(Json::Bool(b)) => Additional::Allowed(*b),
            Some(other) => Additional::Schema(self.at(other)),
        }
    }

    /// The item schema of an array across dialects: a single `items`
    /// schema, the first of an `items` array (pre-2020 tuple form), or
    /// the first of `prefixItems`.
    pub(crate) fn items(&self) -> Option<Self> {
        match self.node.get("items") {
            Some(Json::Array(schemas)) => return schemas.first().map(|s| self.at(s)),
            Some(schema) if schema.is_object() || schema.is_boolean() => {
                return Some(self.at(schema));
            }
            _ => {}
        }
        self.node
            .get("prefixItems")
            .and_then(Json::as_array)
            .and_then(|s| s.first())
            .map(|s| self.at(s))
    }

    pub(crate) fn default_value(&self) -> Option<&'a Json> {
        self.node.get("default")
    }

    pub(crate) fn first_example(&self) -> Option<&'a Json> {
        self.node.get("examples").and_then(Json::as_array)?.first()
    }

    pub(crate) fn first_enum_value(&self) -> Option<&'a Json> {
        self.node.get("enum").and_then(Json::as_array)?.first()
    }
}
