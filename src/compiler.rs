//! Schema compilation - turns a [`Spec`] into a uniform [`Node`] tree.
//!
//! Dispatch, in priority order:
//!
//! 1. builder output: unwrap and recompile its kind with the builder's
//!    constraints laid over the inherited ones
//! 2. absent: unconstrained, forced optional
//! 3. null: the null literal
//! 4. `String`, `Number`, `Boolean`, `Date` markers
//! 5. empty or one-element list, or the `Array` marker: array
//! 6. list of two or more: alternatives
//! 7. `Object` marker: object accepting any keys
//! 8. keyed description: `$type`, then `type` escape hatch, else a field map
//!
//! Compilation is total. Anything unrecognized becomes an unconstrained node.

use crate::spec::{fold_constraints, Spec};
use crate::types::{Constraints, Kind, Primitive};
use crate::value::Value;

/// Shape of a compiled node.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Accepts anything.
    Unconstrained,
    /// Accepts only an equal value.
    Literal(Value),
    Primitive(Primitive),
    Date,
    /// `None` element accepts any items.
    Array(Option<Box<Node>>),
    /// Declared children in declaration order. Empty accepts any keys.
    Object(Vec<(String, Node)>),
    Alternative(Vec<Node>),
}

/// A compiled, immutable schema node.
#[derive(Debug, Clone)]
pub struct Node {
    pub shape: Shape,
    pub constraints: Constraints,
}

impl Node {
    fn new(shape: Shape, constraints: Constraints) -> Self {
        Self { shape, constraints }
    }

    /// Display name used in mismatch messages.
    pub fn name(&self) -> String {
        match &self.shape {
            Shape::Unconstrained => "Any".to_string(),
            Shape::Literal(Value::Null) => "null".to_string(),
            Shape::Literal(value) => value.to_json_string(),
            Shape::Primitive(p) => p.name().to_string(),
            Shape::Date => Kind::Date.name().to_string(),
            Shape::Array(_) => Kind::Array.name().to_string(),
            Shape::Object(_) => Kind::Object.name().to_string(),
            Shape::Alternative(variants) => variants
                .iter()
                .map(Node::name)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    pub fn is_required(&self) -> bool {
        self.constraints.is_required()
    }
}

/// Compile a specification into a node tree.
pub fn compile(spec: &Spec) -> Node {
    compile_with(spec, Constraints::default())
}

fn compile_with(spec: &Spec, mut inherited: Constraints) -> Node {
    match spec {
        Spec::Builder(ty) => compile_with(ty.kind(), inherited.merged(ty.constraints())),
        Spec::Absent => {
            inherited.required = Some(false);
            Node::new(Shape::Unconstrained, inherited)
        }
        Spec::Null => Node::new(Shape::Literal(Value::Null), inherited),
        Spec::Kind(kind) => compile_kind(*kind, inherited),
        Spec::List(items) => match items.as_slice() {
            [] => Node::new(Shape::Array(None), inherited),
            [element] => {
                let element = compile(element);
                Node::new(Shape::Array(Some(Box::new(element))), inherited)
            }
            variants => Node::new(
                Shape::Alternative(variants.iter().map(compile).collect()),
                inherited,
            ),
        },
        Spec::Fields(map) => {
            let type_key = if map.contains_key("$type") {
                Some("$type")
            } else {
                match map.get("type") {
                    Some(ty) if !ty.is_field_description() && !matches!(ty, Spec::Builder(_)) => {
                        Some("type")
                    }
                    _ => None,
                }
            };

            match type_key.and_then(|key| map.get(key)) {
                Some(ty) => compile_with(ty, fold_constraints(map).merged(&inherited)),
                None => {
                    let children = map
                        .iter()
                        .map(|(key, child)| (key.clone(), compile(child)))
                        .collect();
                    Node::new(Shape::Object(children), inherited)
                }
            }
        }
        Spec::Literal(_) | Spec::Pattern(_) => Node::new(Shape::Unconstrained, inherited),
    }
}

fn compile_kind(kind: Kind, inherited: Constraints) -> Node {
    let shape = match kind {
        Kind::String => Shape::Primitive(Primitive::String),
        Kind::Number => Shape::Primitive(Primitive::Number),
        Kind::Boolean => Shape::Primitive(Primitive::Boolean),
        Kind::Date => Shape::Date,
        Kind::Array => Shape::Array(None),
        Kind::Object => Shape::Object(Vec::new()),
    };
    Node::new(shape, inherited)
}
