//! Shape Schema
//!
//! Runtime validation, coercion and normalization of dynamic values.
//!
//! A specification describes the expected shape of a value: primitive kinds,
//! nested objects, arrays, alternatives, and per-field constraints. It is
//! compiled once into a [`Schema`], which then validates any number of
//! values, and can also produce a synthetic [`Schema::example`] and a
//! [`Schema::summary`] document.
//!
//! # Example
//!
//! ```
//! use shape_schema::{Schema, Spec, Value};
//! use serde_json::json;
//!
//! let schema = Schema::new(Spec::from_json(&json!({
//!     "name": "String",
//!     "tel": { "type": "String", "required": true, "match": "^[0-9]{11}$" },
//!     "gender": { "type": "String", "enums": ["male", "female"], "default": "male" },
//!     "birth": "Date",
//!     "hobbies": ["String"]
//! })));
//!
//! let out = schema
//!     .validate(Value::from(json!({
//!         "name": "Zhang San",
//!         "tel": "15888888888",
//!         "birth": "1992-11-22",
//!         "hobbies": ["go"],
//!         "nickname": "dropped"
//!     })))
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(
//!     out.to_json(),
//!     json!({
//!         "name": "Zhang San",
//!         "tel": "15888888888",
//!         "gender": "male",
//!         "birth": "1992-11-22T00:00:00.000Z",
//!         "hobbies": ["go"]
//!     })
//! );
//!
//! let err = schema.validate(Value::from(json!({ "name": "x" }))).unwrap_err();
//! assert_eq!(err.route(), "v.tel");
//! assert_eq!(err.original_message, "is required");
//! ```
//!
//! # Specification forms
//!
//! | Form | Compiles to |
//! |------|-------------|
//! | absent | anything, optional |
//! | `null` | the null literal |
//! | `String` / `Number` / `Boolean` / `Date` | primitive or date, with coercion |
//! | `[]`, `Array` | array of anything |
//! | `[spec]` | array whose items match `spec` |
//! | `[a, b, ...]` | any one of the alternatives |
//! | `Object`, `{}` | any object |
//! | `{ "type": spec, ...constraints }` | `spec` with constraints (`$type` wins over `type`) |
//! | `{ key: spec, ... }` | object with exactly these keys |
//!
//! Builders ([`of`]) attach constraints in code:
//!
//! ```
//! use shape_schema::{of, Kind, Schema, Spec, Value};
//!
//! let schema = Schema::new(Spec::fields([
//!     ("age", of(Kind::Number).min(0.0).max(150.0)),
//!     ("nick", of(Kind::String).optional().disallow_empty()),
//! ]));
//! assert!(schema.validate(Value::from(serde_json::json!({ "age": 200 }))).is_err());
//! ```

mod builder;
mod compiler;
mod error;
mod example;
mod linter;
mod loader;
mod schema;
mod spec;
mod summary;
mod types;
mod validator;
mod value;

pub use builder::{
    of, optional_boolean, optional_date, optional_number, optional_string, required_boolean,
    required_date, required_number, required_string, Mixin, Type,
};
pub use compiler::{compile, Node, Shape};
pub use error::{CheckError, LoadError, ValidationError};
pub use example::example;
pub use linter::{lint, lint_file, lint_spec, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{
    check_file, is_url, load_json, load_json_auto, load_json_str, load_spec, load_spec_str,
    load_value, load_value_str,
};
pub use schema::Schema;
pub use spec::{fold_constraints, Spec};
pub use summary::{summarize, Summary};
pub use types::{Constraints, Kind, Primitive, Segment, ValidateOptions};
pub use validator::validate_node;
pub use value::Value;

#[cfg(feature = "remote")]
pub use loader::load_json_url;
