//! Core types shared by the compiler, validator and generators.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::value::Value;

/// Constraint keys recognized inside escape-hatch objects and builder mix-ins.
pub const CONSTRAINT_KEYS: &[&str] = &[
    "default",
    "required",
    "min",
    "max",
    "match",
    "invalid",
    "enums",
    "explain",
    "error",
    "disallowEmpty",
];

/// Default root route segment.
pub const DEFAULT_ROOT: &str = "v";

/// Default maximum length of the value preview in failure messages.
pub const DEFAULT_PREVIEW_LEN: usize = 100;

/// A kind marker in a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
}

impl Kind {
    /// Parse a kind marker from its name (`"String"`, `"Number"`, ...).
    ///
    /// Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "String" => Some(Kind::String),
            "Number" => Some(Kind::Number),
            "Boolean" => Some(Kind::Boolean),
            "Date" => Some(Kind::Date),
            "Array" => Some(Kind::Array),
            "Object" => Some(Kind::Object),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "String",
            Kind::Number => "Number",
            Kind::Boolean => "Boolean",
            Kind::Date => "Date",
            Kind::Array => "Array",
            Kind::Object => "Object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Primitive kinds checked by exact type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "String",
            Primitive::Number => "Number",
            Primitive::Boolean => "Boolean",
        }
    }

    /// Whether `value` carries this primitive's type tag.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Primitive::String, Value::String(_))
                | (Primitive::Number, Value::Number(_))
                | (Primitive::Boolean, Value::Bool(_))
        )
    }
}

/// Optional validation and transform directives attached to a node.
///
/// Every field is optional so that overlays only replace what was set.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub default: Option<Value>,
    pub required: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// The `match` directive.
    pub pattern: Option<Regex>,
    pub invalid: Option<Vec<Value>>,
    pub enums: Option<Vec<Value>>,
    pub explain: Option<String>,
    pub error: Option<String>,
    pub disallow_empty: Option<bool>,
}

impl Constraints {
    /// A node is required unless `required` was explicitly set to `false`.
    pub fn is_required(&self) -> bool {
        self.required != Some(false)
    }

    pub fn disallows_empty(&self) -> bool {
        self.disallow_empty == Some(true)
    }

    /// Overlay every directive set in `other` onto `self`.
    pub fn overlay(&mut self, other: &Constraints) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(default, required, min, max, pattern, invalid, enums, explain, error, disallow_empty);
    }

    /// `self` overlaid with `other`, leaving both inputs untouched.
    pub fn merged(&self, other: &Constraints) -> Constraints {
        let mut merged = self.clone();
        merged.overlay(other);
        merged
    }
}

/// One step of a route from the schema root to a failing node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Options for validation.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Route segment naming the root value in failure routes.
    pub root: String,
    /// Maximum characters of the offending value quoted in messages.
    pub preview_len: usize,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }

    /// Set the root route segment.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the value preview length.
    pub fn preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self::new()
    }
}
