//! Recursive validation and normalization against a compiled node tree.
//!
//! Per node, short-circuiting on the first failure: default substitution,
//! required check, coercion, type tag, literal, numeric bounds, pattern,
//! blacklist and whitelist, then the shape-specific checks (date, array
//! elements, alternatives, object children).
//!
//! Arrays are rewritten in place. Objects with declared children are
//! rebuilt from the declared keys only, in declaration order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;

use crate::compiler::{Node, Shape};
use crate::error::ValidationError;
use crate::types::{Primitive, Segment, ValidateOptions};
use crate::value::{format_number, Value};

/// Why a node rejected its value.
enum Failure {
    /// Rooted at this node; carries the value as it stood.
    Here {
        reason: String,
        value: Option<Value>,
    },
    /// Rooted at a child or element.
    Nested(ValidationError),
}

impl Failure {
    fn here(reason: impl Into<String>, value: Option<Value>) -> Self {
        Failure::Here {
            reason: reason.into(),
            value,
        }
    }

    fn mismatch(node: &Node, value: Value) -> Self {
        Failure::here(format!("not match [{}]", node.name()), Some(value))
    }
}

/// Validate `value` against `node`, naming this level `segment` in routes.
///
/// Returns `Ok(None)` when an optional value is absent.
pub fn validate_node(
    node: &Node,
    value: Option<Value>,
    segment: Segment,
    options: &ValidateOptions,
) -> Result<Option<Value>, ValidationError> {
    let mut err = match check(node, value, options) {
        Ok(value) => return Ok(value),
        Err(Failure::Here { reason, value }) => {
            ValidationError::new(segment, reason, preview(value.as_ref(), options.preview_len))
        }
        Err(Failure::Nested(mut err)) => {
            err.prefix(segment);
            err
        }
    };

    if let Some(error) = &node.constraints.error {
        err.customize(error);
    }
    Err(err)
}

fn check(
    node: &Node,
    value: Option<Value>,
    options: &ValidateOptions,
) -> Result<Option<Value>, Failure> {
    let constraints = &node.constraints;

    let value = value.or_else(|| constraints.default.clone());
    let Some(value) = value else {
        return absent(node);
    };

    let Some(value) = coerce(node, value) else {
        return absent(node);
    };

    match &node.shape {
        Shape::Primitive(primitive) if !primitive.accepts(&value) => {
            return Err(Failure::mismatch(node, value));
        }
        Shape::Literal(expected) if *expected != value => {
            return Err(Failure::mismatch(node, value));
        }
        _ => {}
    }

    if let (Shape::Primitive(Primitive::Number), Some(n)) = (&node.shape, value.as_f64()) {
        if n.is_nan() {
            return Err(Failure::here("is not a number", Some(value)));
        }
        if let Some(min) = constraints.min {
            if n < min {
                return Err(Failure::here(
                    format!("should ≥ {}", format_number(min)),
                    Some(value),
                ));
            }
        }
        if let Some(max) = constraints.max {
            if n > max {
                return Err(Failure::here(
                    format!("should ≤ {}", format_number(max)),
                    Some(value),
                ));
            }
        }
    }

    if let Some(re) = &constraints.pattern {
        let matched = match &value {
            Value::String(s) => re.is_match(s),
            other => re.is_match(&other.to_text()),
        };
        if !matched {
            return Err(Failure::here(
                format!("not match /{}/", re.as_str()),
                Some(value),
            ));
        }
    }

    if let Some(invalid) = &constraints.invalid {
        if invalid.contains(&value) {
            return Err(Failure::here(
                format!("should not in [{}]", list_text(invalid)),
                Some(value),
            ));
        }
    }

    if let Some(enums) = &constraints.enums {
        if !enums.contains(&value) {
            return Err(Failure::here(
                format!("is not in [{}]", list_text(enums)),
                Some(value),
            ));
        }
    }

    match &node.shape {
        Shape::Date => match value {
            date @ Value::Date(_) => Ok(Some(date)),
            other => Err(Failure::mismatch(node, other)),
        },
        Shape::Array(element) => match value {
            Value::Array(mut items) => {
                if let Some(element) = element {
                    for (index, item) in items.iter_mut().enumerate() {
                        let input = std::mem::replace(item, Value::Null);
                        *item = validate_node(element, Some(input), Segment::Index(index), options)
                            .map_err(Failure::Nested)?
                            .unwrap_or(Value::Null);
                    }
                }
                Ok(Some(Value::Array(items)))
            }
            other => Err(Failure::mismatch(node, other)),
        },
        Shape::Alternative(variants) => {
            let matched = variants.iter().any(|variant| {
                let root = Segment::Key(options.root.clone());
                match validate_node(variant, Some(value.clone()), root, options) {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::trace!(variant = %variant.name(), error = %err, "alternative rejected");
                        false
                    }
                }
            });
            if matched {
                Ok(Some(value))
            } else {
                Err(Failure::mismatch(node, value))
            }
        }
        Shape::Object(children) => match value {
            Value::Object(mut map) => {
                if children.is_empty() {
                    return Ok(Some(Value::Object(map)));
                }
                let mut output = IndexMap::with_capacity(children.len());
                for (key, child) in children {
                    let input = map.shift_remove(key);
                    let segment = Segment::Key(key.clone());
                    if let Some(validated) =
                        validate_node(child, input, segment, options).map_err(Failure::Nested)?
                    {
                        output.insert(key.clone(), validated);
                    }
                }
                Ok(Some(Value::Object(output)))
            }
            other => Err(Failure::mismatch(node, other)),
        },
        Shape::Unconstrained | Shape::Literal(_) | Shape::Primitive(_) => Ok(Some(value)),
    }
}

fn absent(node: &Node) -> Result<Option<Value>, Failure> {
    if node.is_required() {
        Err(Failure::here("is required", None))
    } else {
        Ok(None)
    }
}

/// Apply the node's coercion transform. `None` means the value now counts
/// as absent.
fn coerce(node: &Node, value: Value) -> Option<Value> {
    let coerced = match &node.shape {
        Shape::Primitive(Primitive::String) => {
            let value = match value {
                Value::Bytes(data) => Value::String(String::from_utf8_lossy(&data).into_owned()),
                other => other,
            };
            if node.constraints.disallows_empty() && value.as_str() == Some("") {
                return None;
            }
            value
        }
        Shape::Primitive(Primitive::Number) => match value {
            Value::String(s) => match parse_number(&s) {
                Some(n) => Value::Number(n),
                None => Value::String(s),
            },
            other => other,
        },
        Shape::Primitive(Primitive::Boolean) => coerce_boolean(value),
        Shape::Date => coerce_date(value),
        Shape::Array(_) => parse_json_text(value),
        Shape::Object(_) => Value::from(parse_json_text(value).to_json()),
        Shape::Unconstrained | Shape::Literal(_) | Shape::Alternative(_) => value,
    };
    Some(coerced)
}

/// Decimal text, plus the exact spellings `Infinity` and `NaN` with an
/// optional sign. Rust-only spellings such as `inf` or `nan` are rejected.
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let n = match digits {
        "Infinity" => f64::INFINITY,
        "NaN" => f64::NAN,
        _ if digits.starts_with(|c: char| c.is_ascii_alphabetic()) => return None,
        _ => return text.parse().ok(),
    };
    Some(if negative { -n } else { n })
}

fn coerce_boolean(value: Value) -> Value {
    match &value {
        Value::Number(n) if *n == 1.0 => Value::Bool(true),
        Value::Number(n) if *n == 0.0 => Value::Bool(false),
        Value::String(s) => match s.as_str() {
            "1" | "true" | "T" => Value::Bool(true),
            "0" | "false" | "F" => Value::Bool(false),
            _ => value,
        },
        _ => value,
    }
}

/// Dates pass through; strings and epoch milliseconds are parsed and
/// truncated to millisecond precision. Unparseable input is left as is.
fn coerce_date(value: Value) -> Value {
    let parsed = match &value {
        Value::Date(_) => return value,
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(n.trunc() as i64),
        _ => None,
    };
    match parsed.and_then(|date| DateTime::from_timestamp_millis(date.timestamp_millis())) {
        Some(date) => Value::Date(date),
        None => value,
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// ISO-8601 instants, down to minute precision, year-month and bare year.
/// Zone-less input is read as UTC.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(s, format) {
            return Some(date.with_timezone(&Utc));
        }
    }

    let naive = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(date.and_utc());
        }
    }

    let day = match naive.len() {
        4 if naive.bytes().all(|b| b.is_ascii_digit()) => format!("{}-01-01", naive),
        7 => format!("{}-01", naive),
        _ => naive.to_string(),
    };
    NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Strings holding JSON are decoded; anything else is returned unchanged.
fn parse_json_text(value: Value) -> Value {
    match value {
        Value::String(s) => match serde_json::from_str::<serde_json::Value>(&s) {
            Ok(json) => Value::from(json),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

fn list_text(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_text)
        .collect::<Vec<_>>()
        .join(",")
}

fn preview(value: Option<&Value>, max_len: usize) -> String {
    let Some(value) = value else {
        return "undefined".to_string();
    };
    let text = value.to_json_string();
    if text.chars().count() > max_len {
        let truncated: String = text.chars().take(max_len).collect();
        format!("{} ...", truncated)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::spec::Spec;
    use serde_json::json;

    fn run(spec: serde_json::Value, value: Option<Value>) -> Result<Option<Value>, ValidationError> {
        let node = compile(&Spec::from_json(&spec));
        validate_node(&node, value, Segment::from("v"), &ValidateOptions::default())
    }

    fn ok(spec: serde_json::Value, value: serde_json::Value) -> serde_json::Value {
        run(spec, Some(Value::from(value)))
            .unwrap()
            .map(|v| v.to_json())
            .unwrap_or(serde_json::Value::Null)
    }

    fn fail(spec: serde_json::Value, value: serde_json::Value) -> ValidationError {
        run(spec, Some(Value::from(value))).unwrap_err()
    }

    #[test]
    fn number_coercion() {
        assert_eq!(ok(json!("Number"), json!("1")), json!(1));
        assert_eq!(ok(json!("Number"), json!(" 2.5 ")), json!(2.5));
        let err = fail(json!("Number"), json!("abc"));
        assert_eq!(err.original_message, "not match [Number]");
        assert_eq!(fail(json!("Number"), json!("")).original_message, "not match [Number]");
    }

    #[test]
    fn number_coercion_spellings() {
        for text in ["inf", "-inf", "infinity", "nan", "+inf"] {
            assert_eq!(
                fail(json!("Number"), json!(text)).original_message,
                "not match [Number]",
                "{} should stay text",
                text
            );
        }
        assert_eq!(
            run(json!("Number"), Some(Value::from("Infinity"))).unwrap(),
            Some(Value::Number(f64::INFINITY))
        );
        assert_eq!(
            run(json!("Number"), Some(Value::from("-Infinity"))).unwrap(),
            Some(Value::Number(f64::NEG_INFINITY))
        );
        assert_eq!(fail(json!("Number"), json!("NaN")).original_message, "is not a number");
        assert_eq!(ok(json!("Number"), json!("-3")), json!(-3));
        assert_eq!(ok(json!("Number"), json!("1e3")), json!(1000));
    }

    #[test]
    fn nan_is_rejected() {
        let node = compile(&Spec::from_json(&json!("Number")));
        let err = validate_node(
            &node,
            Some(Value::Number(f64::NAN)),
            Segment::from("v"),
            &ValidateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.original_message, "is not a number");
    }

    #[test]
    fn boolean_coercion() {
        assert_eq!(ok(json!("Boolean"), json!("T")), json!(true));
        assert_eq!(ok(json!("Boolean"), json!(1)), json!(true));
        assert_eq!(ok(json!("Boolean"), json!("true")), json!(true));
        assert_eq!(ok(json!("Boolean"), json!(0)), json!(false));
        assert_eq!(ok(json!("Boolean"), json!("F")), json!(false));
        assert_eq!(ok(json!("Boolean"), json!("0")), json!(false));
        assert!(run(json!("Boolean"), Some(Value::from("yes"))).is_err());
        assert!(run(json!("Boolean"), Some(Value::from(2))).is_err());
    }

    #[test]
    fn string_decodes_bytes() {
        let out = run(json!("String"), Some(Value::bytes("World"))).unwrap();
        assert_eq!(out, Some(Value::from("World")));
    }

    #[test]
    fn disallow_empty_treats_empty_as_absent() {
        let spec = json!({ "type": "String", "disallowEmpty": true });
        let err = fail(spec.clone(), json!(""));
        assert_eq!(err.original_message, "is required");

        let spec = json!({ "type": "String", "disallowEmpty": true, "required": false });
        assert_eq!(run(spec, Some(Value::from(""))).unwrap(), None);

        assert_eq!(ok(json!("String"), json!("")), json!(""));
    }

    #[test]
    fn date_coercion() {
        assert_eq!(
            ok(json!("Date"), json!("1992-11-22")),
            json!("1992-11-22T00:00:00.000Z")
        );
        assert_eq!(
            ok(json!("Date"), json!("2020-01-02T03:04:05+02:00")),
            json!("2020-01-02T01:04:05.000Z")
        );
        assert_eq!(ok(json!("Date"), json!(0)), json!("1970-01-01T00:00:00.000Z"));
        assert_eq!(
            ok(json!("Date"), json!("2020-01-02T03:04Z")),
            json!("2020-01-02T03:04:00.000Z")
        );
        assert_eq!(
            ok(json!("Date"), json!("2020-01-02T03:04")),
            json!("2020-01-02T03:04:00.000Z")
        );
        assert_eq!(
            ok(json!("Date"), json!("2020-01-02T03:04:05.000+0800")),
            json!("2020-01-01T19:04:05.000Z")
        );
        assert_eq!(
            ok(json!("Date"), json!("2020-01-02T03:04+01:00")),
            json!("2020-01-02T02:04:00.000Z")
        );
        assert_eq!(ok(json!("Date"), json!("2020-01")), json!("2020-01-01T00:00:00.000Z"));
        assert_eq!(ok(json!("Date"), json!("2020")), json!("2020-01-01T00:00:00.000Z"));
        assert_eq!(fail(json!("Date"), json!("2020-13")).original_message, "not match [Date]");
        let err = fail(json!("Date"), json!("not a date"));
        assert_eq!(err.original_message, "not match [Date]");
        assert!(run(json!("Date"), Some(Value::Bool(true))).is_err());
    }

    #[test]
    fn date_is_idempotent() {
        let first = run(json!("Date"), Some(Value::from("2021-06-01T12:30:00.123456Z")))
            .unwrap()
            .unwrap();
        let second = run(json!("Date"), Some(first.clone())).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bounds() {
        let spec = json!({ "type": "Number", "min": 1, "max": 10 });
        assert_eq!(ok(spec.clone(), json!(5)), json!(5));
        assert_eq!(fail(spec.clone(), json!(0)).original_message, "should ≥ 1");
        assert_eq!(fail(spec, json!(11)).original_message, "should ≤ 10");
    }

    #[test]
    fn bounds_are_inert_on_strings() {
        let spec = json!({ "type": "String", "min": 10 });
        assert_eq!(ok(spec, json!("x")), json!("x"));
    }

    #[test]
    fn pattern_applies_to_any_kind() {
        let spec = json!({ "type": "String", "match": "^[0-9]{11}$" });
        assert_eq!(ok(spec.clone(), json!("15888888888")), json!("15888888888"));
        let err = fail(spec, json!("123"));
        assert_eq!(err.original_message, "not match /^[0-9]{11}$/");

        let spec = json!({ "type": "Number", "match": "^4" });
        assert_eq!(ok(spec.clone(), json!(42)), json!(42));
        assert!(run(spec, Some(Value::from(24))).is_err());
    }

    #[test]
    fn blacklist_and_whitelist() {
        let spec = json!({ "type": "String", "invalid": ["root", "admin"] });
        assert_eq!(
            fail(spec, json!("root")).original_message,
            "should not in [root,admin]"
        );

        let spec = json!({ "type": "String", "enums": ["male", "female"] });
        assert_eq!(ok(spec.clone(), json!("female")), json!("female"));
        assert_eq!(
            fail(spec, json!("other")).original_message,
            "is not in [male,female]"
        );
    }

    #[test]
    fn null_literal() {
        assert_eq!(ok(json!(null), json!(null)), json!(null));
        assert_eq!(fail(json!(null), json!(0)).original_message, "not match [null]");
    }

    #[test]
    fn absent_values() {
        assert!(run(json!("String"), None).unwrap_err().original_message == "is required");
        let spec = json!({ "type": "String", "required": false });
        assert_eq!(run(spec, None).unwrap(), None);
        let spec = json!({ "type": "String", "default": "male" });
        assert_eq!(run(spec, None).unwrap(), Some(Value::from("male")));
    }

    #[test]
    fn array_elements_are_validated_in_place() {
        assert_eq!(ok(json!(["Number"]), json!([1, "2"])), json!([1, 2]));
        let err = fail(json!(["Number"]), json!([1, "x"]));
        assert_eq!(err.route(), "v.1");
        assert_eq!(err.routes, vec![Segment::from("v"), Segment::Index(1)]);
    }

    #[test]
    fn array_decodes_json_text() {
        assert_eq!(ok(json!([]), json!("[1,2]")), json!([1, 2]));
        assert_eq!(fail(json!([]), json!("nope")).original_message, "not match [Array]");
        assert_eq!(fail(json!("Array"), json!({})).original_message, "not match [Array]");
    }

    #[test]
    fn alternative_keeps_original_value() {
        let spec = json!(["Number", "Boolean"]);
        // "1" matches Number after coercion, but the stored value is untouched.
        assert_eq!(ok(spec.clone(), json!("1")), json!("1"));
        assert_eq!(ok(spec.clone(), json!(true)), json!(true));
        let err = fail(spec, json!({}));
        assert_eq!(err.original_message, "not match [Number|Boolean]");
    }

    #[test]
    fn object_keeps_declared_keys_in_order() {
        let spec = json!({ "b": "Number", "a": "String", "c": { "type": "String", "required": false } });
        let out = ok(spec, json!({ "a": "x", "extra": 1, "b": "2" }));
        assert_eq!(out, json!({ "b": 2, "a": "x" }));
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn bare_object_keeps_all_keys() {
        assert_eq!(ok(json!("Object"), json!({ "a": 1 })), json!({ "a": 1 }));
        assert_eq!(ok(json!({}), json!("{\"a\":1}")), json!({ "a": 1 }));
        assert_eq!(fail(json!("Object"), json!([1])).original_message, "not match [Object]");
    }

    #[test]
    fn object_round_trip_normalizes_dates() {
        let node = compile(&Spec::from_json(&json!("Object")));
        let date = DateTime::from_timestamp_millis(0).unwrap();
        let mut map = IndexMap::new();
        map.insert("at".to_string(), Value::Date(date));
        let out = validate_node(
            &node,
            Some(Value::Object(map)),
            Segment::from("v"),
            &ValidateOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(out.get("at"), Some(&Value::from("1970-01-01T00:00:00.000Z")));
    }

    #[test]
    fn nested_route_and_message() {
        let spec = json!({ "hometown": { "province": "String" } });
        let err = fail(spec, json!({ "hometown": {} }));
        assert_eq!(err.route(), "v.hometown.province");
        assert_eq!(err.message, "v.hometown.province is required. v is undefined");
    }

    #[test]
    fn custom_error_wins() {
        let spec = json!({ "age": { "type": "Number", "min": 18, "error": "too young" } });
        let err = fail(spec, json!({ "age": 3 }));
        assert_eq!(err.message, "too young");
        assert!(err.is_custom_error);
        assert_eq!(err.original_message, "should ≥ 18");
        assert_eq!(err.route(), "v.age");
    }

    #[test]
    fn custom_error_covers_nested_causes() {
        let spec = json!({ "type": { "a": "Number" }, "error": "custom" });
        let err = fail(spec, json!({ "a": "x" }));
        assert_eq!(err.message, "custom");
    }

    #[test]
    fn preview_is_truncated() {
        let long = "x".repeat(300);
        let node = compile(&Spec::from_json(&json!("Number")));
        let options = ValidateOptions::default().preview_len(10);
        let err = validate_node(&node, Some(Value::from(long)), Segment::from("v"), &options)
            .unwrap_err();
        assert_eq!(err.message, "v not match [Number]. v is \"xxxxxxxxx ...");
    }
}
