//! Human-readable summary documents.

use indexmap::IndexMap;
use serde::Serialize;

use crate::compiler::{Node, Shape};
use crate::types::Primitive;
use crate::value::Value;

/// Description of one node: name, required-ness, constraints, nested shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid: Option<Vec<Value>>,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<Summary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alter: Option<Vec<Summary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<IndexMap<String, Summary>>,
}

/// Describe `node` and everything below it.
pub fn summarize(node: &Node) -> Summary {
    let c = &node.constraints;
    let non_empty = |list: &Option<Vec<Value>>| list.clone().filter(|l| !l.is_empty());

    let mut summary = Summary {
        type_name: match node.shape {
            Shape::Alternative(_) => "Alter".to_string(),
            _ => node.name(),
        },
        required: node.is_required(),
        explain: c.explain.clone(),
        default: c.default.clone(),
        enums: non_empty(&c.enums),
        invalid: non_empty(&c.invalid),
        pattern: None,
        min: None,
        max: None,
        element: None,
        alter: None,
        object: None,
    };

    match &node.shape {
        Shape::Primitive(Primitive::String) => {
            summary.pattern = c.pattern.as_ref().map(|re| format!("/{}/", re.as_str()));
        }
        Shape::Primitive(Primitive::Number) => {
            summary.min = c.min;
            summary.max = c.max;
        }
        Shape::Array(element) => {
            summary.element = element.as_deref().map(|e| Box::new(summarize(e)));
        }
        Shape::Alternative(variants) => {
            summary.alter = Some(variants.iter().map(summarize).collect());
        }
        Shape::Object(children) => {
            summary.object = Some(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), summarize(child)))
                    .collect(),
            );
        }
        _ => {}
    }

    summary
}
