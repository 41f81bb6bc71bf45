//! Error types for schema loading and validation.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::Segment;

/// A path-qualified validation failure.
///
/// `original_message` holds the generated reason (`"is required"`,
/// `"should ≥ 1"`, `"not match [String]"`, ...). `message` is either the
/// full `"<route> <reason>. v is <value>"` text or, when a node declared an
/// `error` constraint, that text verbatim.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    name: &'static str,
    pub message: String,
    pub original_message: String,
    pub routes: Vec<Segment>,
    pub is_custom_error: bool,
    #[serde(skip)]
    preview: String,
}

impl ValidationError {
    pub(crate) fn new(segment: Segment, reason: impl Into<String>, preview: String) -> Self {
        let mut err = Self {
            name: "ValidationError",
            message: String::new(),
            original_message: reason.into(),
            routes: vec![segment],
            is_custom_error: false,
            preview,
        };
        err.render();
        err
    }

    /// Always `"ValidationError"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Dotted route, e.g. `v.items.0.price`.
    pub fn route(&self) -> String {
        self.routes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Prefix the route with the enclosing segment.
    pub(crate) fn prefix(&mut self, segment: Segment) {
        self.routes.insert(0, segment);
        self.render();
    }

    /// Replace the message with a node's custom text, unless an inner
    /// node already did.
    pub(crate) fn customize(&mut self, error: &str) {
        if !self.is_custom_error {
            self.message = error.to_string();
            self.is_custom_error = true;
        }
    }

    fn render(&mut self) {
        if !self.is_custom_error {
            self.message = format!(
                "{} {}. v is {}",
                self.route(),
                self.original_message,
                self.preview
            );
        }
    }
}

/// Errors while loading specifications or payloads.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors from checking a payload file against a specification file.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl CheckError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckError::Load(e) => e.exit_code(),
            CheckError::Invalid(_) => 1,
        }
    }
}
