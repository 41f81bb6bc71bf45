//! Fluent builder for constraint-annotated kinds.
//!
//! ```
//! use shape_schema::{of, Kind, Schema, Value};
//!
//! let schema = Schema::new(of(Kind::Number).min(1.0).max(10.0).explain("rating"));
//! assert_eq!(schema.validate(Value::from("5")).unwrap(), Some(Value::from(5)));
//! assert!(schema.validate(Value::from(11)).is_err());
//! ```
//!
//! Mutators take the builder by value and hand it back, so chains need no
//! shared mutable state. Constraint values are not checked here; a `min`
//! on a string kind is simply inert during validation.

use indexmap::IndexMap;
use regex::Regex;

use crate::spec::{fold_constraints, Spec};
use crate::types::{Constraints, Kind};
use crate::value::Value;

/// A kind plus the constraints configured for it.
#[derive(Debug, Clone)]
pub struct Type {
    kind: Box<Spec>,
    constraints: Constraints,
}

/// Source for [`Type::mix`]: another builder or a plain keyed description.
#[derive(Debug, Clone)]
pub enum Mixin {
    Type(Type),
    Fields(IndexMap<String, Spec>),
}

impl From<Type> for Mixin {
    fn from(ty: Type) -> Self {
        Mixin::Type(ty)
    }
}

impl From<IndexMap<String, Spec>> for Mixin {
    fn from(map: IndexMap<String, Spec>) -> Self {
        Mixin::Fields(map)
    }
}

/// Start a builder for `kind`. Required by default.
pub fn of(kind: impl Into<Spec>) -> Type {
    Type::new(kind)
}

impl Type {
    /// Wrap `kind`. Passing another builder copies it.
    pub fn new(kind: impl Into<Spec>) -> Self {
        match kind.into() {
            Spec::Builder(ty) => ty,
            kind => Self {
                kind: Box::new(kind),
                constraints: Constraints {
                    required: Some(true),
                    ..Default::default()
                },
            },
        }
    }

    pub fn kind(&self) -> &Spec {
        &self.kind
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Split into the wrapped kind and its constraints.
    pub fn into_parts(self) -> (Spec, Constraints) {
        (*self.kind, self.constraints)
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.constraints.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.constraints.required = Some(false);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    /// The `match` directive.
    pub fn pattern(mut self, re: Regex) -> Self {
        self.constraints.pattern = Some(re);
        self
    }

    pub fn invalid<V: Into<Value>>(mut self, values: Vec<V>) -> Self {
        self.constraints.invalid = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn enums<V: Into<Value>>(mut self, values: Vec<V>) -> Self {
        self.constraints.enums = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn explain(mut self, explain: impl Into<String>) -> Self {
        self.constraints.explain = Some(explain.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.constraints.error = Some(error.into());
        self
    }

    pub fn disallow_empty(mut self) -> Self {
        self.constraints.disallow_empty = Some(true);
        self
    }

    /// Overlay another builder, or the keys of a plain description.
    ///
    /// A `$type`/`type` key (or the other builder's kind) replaces the
    /// wrapped kind; `$type` wins over `type`.
    pub fn mix(mut self, mixin: impl Into<Mixin>) -> Self {
        match mixin.into() {
            Mixin::Type(other) => {
                self.kind = other.kind;
                self.constraints.overlay(&other.constraints);
            }
            Mixin::Fields(map) => {
                if let Some(kind) = map.get("$type").or_else(|| map.get("type")) {
                    self.kind = Box::new(kind.clone());
                }
                self.constraints.overlay(&fold_constraints(&map));
            }
        }
        self
    }
}

/// Required string.
pub fn required_string() -> Type {
    of(Kind::String)
}

/// Required number.
pub fn required_number() -> Type {
    of(Kind::Number)
}

/// Required date.
pub fn required_date() -> Type {
    of(Kind::Date)
}

/// Required boolean.
pub fn required_boolean() -> Type {
    of(Kind::Boolean)
}

/// Optional string.
pub fn optional_string() -> Type {
    of(Kind::String).optional()
}

/// Optional number.
pub fn optional_number() -> Type {
    of(Kind::Number).optional()
}

/// Optional date.
pub fn optional_date() -> Type {
    of(Kind::Date).optional()
}

/// Optional boolean.
pub fn optional_boolean() -> Type {
    of(Kind::Boolean).optional()
}
