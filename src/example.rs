//! Synthetic example values.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::compiler::{Node, Shape};
use crate::types::Primitive;
use crate::value::Value;

/// Placeholder for numbers with no declared bounds.
pub const EXAMPLE_NUMBER: f64 = 1206.0;

/// Produce one representative value for `node`.
///
/// Priority: the null literal, then `default`, then the first `enums`
/// entry, then a kind-specific sample. Optional unconstrained nodes have
/// no example and are left out of generated objects.
pub fn example(node: &Node) -> Option<Value> {
    let constraints = &node.constraints;

    if let Shape::Literal(Value::Null) = node.shape {
        return Some(Value::Null);
    }
    if let Some(default) = &constraints.default {
        return Some(default.clone());
    }
    if let Some(first) = constraints.enums.as_ref().and_then(|e| e.first()) {
        return Some(first.clone());
    }

    match &node.shape {
        Shape::Primitive(Primitive::String) => Some(Value::String(match &constraints.pattern {
            Some(re) => format!("string matches /{}/", re.as_str()),
            None => "string".to_string(),
        })),
        Shape::Primitive(Primitive::Number) => Some(Value::Number(
            constraints
                .min
                .or(constraints.max)
                .unwrap_or(EXAMPLE_NUMBER),
        )),
        Shape::Primitive(Primitive::Boolean) => Some(Value::Bool(true)),
        Shape::Date => Some(Value::Date(now())),
        Shape::Array(element) => Some(Value::Array(
            element
                .as_deref()
                .and_then(example)
                .into_iter()
                .collect(),
        )),
        Shape::Alternative(variants) => variants.first().and_then(example),
        Shape::Object(children) => {
            let map: IndexMap<String, Value> = children
                .iter()
                .filter_map(|(key, child)| example(child).map(|v| (key.clone(), v)))
                .collect();
            Some(Value::Object(map))
        }
        Shape::Literal(value) => Some(value.clone()),
        Shape::Unconstrained if node.is_required() => Some(Value::Null),
        Shape::Unconstrained => None,
    }
}

/// Current instant at millisecond precision, the resolution dates keep
/// after validation.
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::spec::Spec;
    use serde_json::json;

    fn example_json(spec: serde_json::Value) -> Option<serde_json::Value> {
        example(&compile(&Spec::from_json(&spec))).map(|v| v.to_json())
    }

    #[test]
    fn primitives() {
        assert_eq!(example_json(json!("String")), Some(json!("string")));
        assert_eq!(example_json(json!("Number")), Some(json!(1206)));
        assert_eq!(example_json(json!("Boolean")), Some(json!(true)));
        assert_eq!(example_json(json!(null)), Some(json!(null)));
    }

    #[test]
    fn string_notes_pattern() {
        assert_eq!(
            example_json(json!({ "type": "String", "match": "^a+$" })),
            Some(json!("string matches /^a+$/"))
        );
    }

    #[test]
    fn number_prefers_min_then_max() {
        assert_eq!(example_json(json!({ "type": "Number", "min": 3, "max": 9 })), Some(json!(3)));
        assert_eq!(example_json(json!({ "type": "Number", "max": 9 })), Some(json!(9)));
    }

    #[test]
    fn default_then_enums() {
        assert_eq!(
            example_json(json!({ "type": "String", "enums": ["a", "b"], "default": "b" })),
            Some(json!("b"))
        );
        assert_eq!(
            example_json(json!({ "type": "String", "enums": ["a", "b"] })),
            Some(json!("a"))
        );
    }

    #[test]
    fn containers() {
        assert_eq!(example_json(json!([])), Some(json!([])));
        assert_eq!(example_json(json!(["Number"])), Some(json!([1206])));
        assert_eq!(example_json(json!(["String", "Number"])), Some(json!("string")));
        assert_eq!(
            example_json(json!({ "arr": [], "arr2": "Array", "multiple": ["String", "Number"] })),
            Some(json!({ "arr": [], "arr2": [], "multiple": "string" }))
        );
    }

    #[test]
    fn field_named_type() {
        assert_eq!(
            example_json(json!({ "type": { "type": "String" } })),
            Some(json!({ "type": "string" }))
        );
    }

    #[test]
    fn date_is_a_date() {
        let value = example(&compile(&Spec::from_json(&json!("Date")))).unwrap();
        assert!(matches!(value, Value::Date(_)));
    }

    #[test]
    fn optional_unconstrained_is_omitted() {
        let spec = Spec::fields([("a", Spec::Absent), ("b", Spec::from_json(&json!("Boolean")))]);
        let value = example(&compile(&spec)).unwrap();
        assert_eq!(value.to_json(), json!({ "b": true }));
    }
}
