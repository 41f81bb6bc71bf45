//! The compiled schema handle.

use crate::compiler::{compile, Node};
use crate::error::ValidationError;
use crate::example::example;
use crate::spec::Spec;
use crate::summary::{summarize, Summary};
use crate::types::{Segment, ValidateOptions};
use crate::validator::validate_node;
use crate::value::Value;

/// A specification compiled once and reused for any number of calls.
///
/// The compiled tree is immutable, so a `Schema` can be shared across
/// threads freely.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Node,
    options: ValidateOptions,
}

impl Schema {
    /// Compile `spec` with default options. Never fails.
    pub fn new(spec: impl Into<Spec>) -> Self {
        Self::with_options(spec, ValidateOptions::default())
    }

    /// Compile `spec` with explicit validation options.
    pub fn with_options(spec: impl Into<Spec>, options: ValidateOptions) -> Self {
        let root = compile(&spec.into());
        tracing::debug!(root = %root.name(), required = root.is_required(), "compiled schema");
        Self { root, options }
    }

    /// Compile a specification held in a JSON document.
    pub fn from_json(json: &serde_json::Value) -> Self {
        Self::new(Spec::from_json(json))
    }

    pub fn node(&self) -> &Node {
        &self.root
    }

    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Validate and normalize `value`; pass `None` for an absent value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the route to the first failing
    /// node.
    pub fn validate(&self, value: impl Into<Option<Value>>) -> Result<Option<Value>, ValidationError> {
        let root = Segment::Key(self.options.root.clone());
        validate_node(&self.root, value.into(), root, &self.options)
    }

    /// A synthetic value shaped like this schema.
    pub fn example(&self) -> Option<Value> {
        example(&self.root)
    }

    /// A descriptive document for this schema.
    pub fn summary(&self) -> Summary {
        summarize(&self.root)
    }
}

impl Default for Schema {
    /// An unconstrained, optional schema.
    fn default() -> Self {
        Self::new(Spec::Absent)
    }
}
