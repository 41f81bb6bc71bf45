//! User-facing specification syntax.
//!
//! A [`Spec`] is what callers write; [`crate::compile`] turns it into the
//! uniform [`crate::Node`] tree. Specs can be assembled in code or read
//! from JSON documents with [`Spec::from_json`].
//!
//! # JSON form
//!
//! | JSON | Spec |
//! |------|------|
//! | `null` | `Null` literal |
//! | `"String"`, `"Number"`, `"Boolean"`, `"Date"`, `"Array"`, `"Object"` | kind marker |
//! | `[ ... ]` | `List` (array of one, or alternatives) |
//! | `{ ... }` | `Fields` (field map, or `type`/`$type` escape hatch) |
//! | anything else | `Literal` |

use indexmap::IndexMap;
use regex::Regex;

use crate::builder::Type;
use crate::types::{Constraints, Kind};
use crate::value::Value;

/// A raw schema specification.
#[derive(Debug, Clone)]
pub enum Spec {
    /// No declared type; compiles to an optional unconstrained node.
    Absent,
    /// The null marker.
    Null,
    Kind(Kind),
    /// Zero or one element: array. Two or more: alternatives.
    List(Vec<Spec>),
    /// A plain keyed description, in declaration order.
    Fields(IndexMap<String, Spec>),
    /// Raw data, e.g. a constraint value.
    Literal(Value),
    Pattern(Regex),
    Builder(Type),
}

impl Spec {
    /// Build a `Fields` spec from `(key, spec)` pairs.
    pub fn fields<K, S, I>(entries: I) -> Self
    where
        K: Into<String>,
        S: Into<Spec>,
        I: IntoIterator<Item = (K, S)>,
    {
        Spec::Fields(
            entries
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        )
    }

    /// Build a `List` spec.
    pub fn list<S, I>(items: I) -> Self
    where
        S: Into<Spec>,
        I: IntoIterator<Item = S>,
    {
        Spec::List(items.into_iter().map(Into::into).collect())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Spec::Literal(value.into())
    }

    /// Read a specification from a JSON document.
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Spec::Null,
            Json::String(s) => match Kind::parse(s) {
                Some(kind) => Spec::Kind(kind),
                None => Spec::Literal(Value::String(s.clone())),
            },
            Json::Array(items) => Spec::List(items.iter().map(Spec::from_json).collect()),
            Json::Object(map) => Spec::Fields(
                map.iter()
                    .map(|(k, v)| (k.clone(), Spec::from_json(v)))
                    .collect(),
            ),
            other => Spec::Literal(Value::from(other.clone())),
        }
    }

    /// Read this spec back as raw data, for constraint values.
    ///
    /// Kind markers read as their names and patterns as their source.
    /// Builders and `Absent` have no data form.
    pub fn to_literal(&self) -> Option<Value> {
        match self {
            Spec::Absent | Spec::Builder(_) => None,
            Spec::Null => Some(Value::Null),
            Spec::Kind(kind) => Some(Value::String(kind.name().to_string())),
            Spec::List(items) => Some(Value::Array(
                items.iter().filter_map(Spec::to_literal).collect(),
            )),
            Spec::Fields(map) => Some(Value::Object(
                map.iter()
                    .filter_map(|(k, s)| s.to_literal().map(|v| (k.clone(), v)))
                    .collect(),
            )),
            Spec::Literal(value) => Some(value.clone()),
            Spec::Pattern(re) => Some(Value::String(re.as_str().to_string())),
        }
    }

    /// Whether this spec is a field description carrying its own `type`/`$type`.
    pub(crate) fn is_field_description(&self) -> bool {
        match self {
            Spec::Fields(map) => map.contains_key("type") || map.contains_key("$type"),
            _ => false,
        }
    }
}

/// Fold the constraint keys of an escape-hatch object into a constraint set.
///
/// `type` and `$type` are skipped; unknown keys and values of the wrong
/// shape are ignored.
pub fn fold_constraints(map: &IndexMap<String, Spec>) -> Constraints {
    let mut constraints = Constraints::default();

    for (key, spec) in map {
        match key.as_str() {
            "default" => constraints.default = spec.to_literal(),
            "required" => {
                constraints.required = spec
                    .to_literal()
                    .map(|v| !matches!(v, Value::Bool(false)))
            }
            "min" => constraints.min = spec.to_literal().and_then(|v| v.as_f64()),
            "max" => constraints.max = spec.to_literal().and_then(|v| v.as_f64()),
            "match" => constraints.pattern = pattern_of(spec),
            "invalid" => constraints.invalid = list_of(spec),
            "enums" => constraints.enums = list_of(spec),
            "explain" => constraints.explain = text_of(spec),
            "error" => constraints.error = text_of(spec),
            "disallowEmpty" => {
                constraints.disallow_empty = match spec.to_literal() {
                    Some(Value::Bool(b)) => Some(b),
                    _ => None,
                }
            }
            _ => {}
        }
    }

    constraints
}

fn pattern_of(spec: &Spec) -> Option<Regex> {
    match spec {
        Spec::Pattern(re) => Some(re.clone()),
        Spec::Literal(Value::String(source)) => match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(pattern = %source, error = %e, "ignoring invalid match pattern");
                None
            }
        },
        _ => None,
    }
}

fn list_of(spec: &Spec) -> Option<Vec<Value>> {
    match spec.to_literal() {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn text_of(spec: &Spec) -> Option<String> {
    match spec.to_literal() {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl From<Kind> for Spec {
    fn from(kind: Kind) -> Self {
        Spec::Kind(kind)
    }
}

impl From<Type> for Spec {
    fn from(ty: Type) -> Self {
        Spec::Builder(ty)
    }
}

impl From<Regex> for Spec {
    fn from(re: Regex) -> Self {
        Spec::Pattern(re)
    }
}

impl From<Value> for Spec {
    fn from(value: Value) -> Self {
        Spec::Literal(value)
    }
}

impl From<Vec<Spec>> for Spec {
    fn from(items: Vec<Spec>) -> Self {
        Spec::List(items)
    }
}

impl From<IndexMap<String, Spec>> for Spec {
    fn from(map: IndexMap<String, Spec>) -> Self {
        Spec::Fields(map)
    }
}

impl From<Option<Spec>> for Spec {
    fn from(spec: Option<Spec>) -> Self {
        spec.unwrap_or(Spec::Absent)
    }
}
