//! Specification linting - static analysis of JSON specification files.
//!
//! Compilation never fails, so mistakes in a specification surface only as
//! surprising validation results. The linter reports them up front:
//! - unreadable files and JSON syntax errors
//! - `match` sources that are not valid regular expressions
//! - `min` greater than `max`
//! - unknown constraint keys and constraints that are inert for the kind
//! - defaults that the node's own `enums`/`invalid` would reject

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::loader::load_json;
use crate::types::{Kind, CONSTRAINT_KEYS};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/user/age/min")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
/// Returns aggregated results for all files.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_spec_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += count(&file_result, Severity::Error);
        total_warnings += count(&file_result, Severity::Warning);
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

fn count(result: &FileResult, severity: Severity) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}

/// Lint a single specification file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut diagnostics = Vec::new();

    match load_json(file) {
        Ok(spec) => lint_value(&spec, file, "", &mut diagnostics),
        Err(e) => {
            let (code, message) = match e {
                LoadError::InvalidJson { .. } => ("E001", format!("syntax error: {}", e)),
                _ => ("E004", format!("unreadable file: {}", e)),
            };
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                code: code.to_string(),
                file: file.to_path_buf(),
                path: "/".to_string(),
                message,
            });
        }
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

/// Lint an in-memory specification document.
pub fn lint_spec(spec: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    lint_value(spec, Path::new(""), "", &mut diagnostics);
    diagnostics
}

/// Walk a specification the way the compiler dispatches it.
fn lint_value(value: &Value, file: &Path, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    match value {
        Value::Object(map) => match type_key(map) {
            Some(key) => {
                check_constraints(map, key, file, path, diagnostics);
                let child_path = format!("{}/{}", path, key);
                lint_value(&map[key], file, &child_path, diagnostics);
            }
            None => {
                for (key, val) in map {
                    let child_path = format!("{}/{}", path, key);
                    lint_value(val, file, &child_path, diagnostics);
                }
            }
        },
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                lint_value(item, file, &child_path, diagnostics);
            }
        }
        _ => {}
    }
}

/// The escape-hatch key of a keyed specification, if it has one.
fn type_key(map: &Map<String, Value>) -> Option<&'static str> {
    if map.contains_key("$type") {
        return Some("$type");
    }
    match map.get("type") {
        Some(Value::Object(inner)) if inner.contains_key("type") || inner.contains_key("$type") => {
            None
        }
        Some(_) => Some("type"),
        None => None,
    }
}

/// Check the constraint keys of an escape-hatch object.
fn check_constraints(
    map: &Map<String, Value>,
    type_key: &str,
    file: &Path,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let kind = map[type_key].as_str().and_then(Kind::parse);
    let mut push = |severity: Severity, code: &str, key: &str, message: String| {
        diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: file.to_path_buf(),
            path: format!("{}/{}", path, key),
            message,
        });
    };

    for key in map.keys() {
        if key == "type" || key == "$type" {
            continue;
        }
        if !CONSTRAINT_KEYS.contains(&key.as_str()) {
            push(
                Severity::Warning,
                "W001",
                key.as_str(),
                format!(
                    "unknown constraint \"{}\": expected {}",
                    key,
                    CONSTRAINT_KEYS.join(", ")
                ),
            );
        }
    }

    match map.get("match") {
        Some(Value::String(source)) => {
            if let Err(e) = Regex::new(source) {
                push(
                    Severity::Error,
                    "E002",
                    "match",
                    format!("invalid pattern: {}", e),
                );
            }
        }
        Some(other) => push(
            Severity::Error,
            "E002",
            "match",
            format!("invalid pattern: expected string, got {}", json_type_name(other)),
        ),
        None => {}
    }

    let min = map.get("min").and_then(Value::as_f64);
    let max = map.get("max").and_then(Value::as_f64);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            push(
                Severity::Error,
                "E003",
                "min",
                format!("min {} is greater than max {}", min, max),
            );
        }
    }

    if let Some(kind) = kind {
        for key in ["min", "max"] {
            if kind != Kind::Number && map.contains_key(key) {
                push(
                    Severity::Warning,
                    "W002",
                    key,
                    format!("{} has no effect on {}", key, kind),
                );
            }
        }
        if kind != Kind::String && map.contains_key("disallowEmpty") {
            push(
                Severity::Warning,
                "W002",
                "disallowEmpty",
                format!("disallowEmpty has no effect on {}", kind),
            );
        }
    }

    if let Some(default) = map.get("default") {
        if let Some(enums) = map.get("enums").and_then(Value::as_array) {
            if !enums.is_empty() && !enums.contains(default) {
                push(
                    Severity::Warning,
                    "W003",
                    "default",
                    "default is not among enums".to_string(),
                );
            }
        }
        if let Some(invalid) = map.get("invalid").and_then(Value::as_array) {
            if invalid.contains(default) {
                push(
                    Severity::Warning,
                    "W003",
                    "default",
                    "default is listed in invalid".to_string(),
                );
            }
        }
    }
}

/// Returns the JSON type name for diagnostics.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_spec_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn codes(spec: Value) -> Vec<String> {
        lint_spec(&spec).into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn lint_valid_spec() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
            "name": "String",
            "age": {{ "type": "Number", "min": 0, "max": 150 }}
        }}"#
        )
        .unwrap();

        let result = lint_file(file.path(), file.path().parent().unwrap());
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_missing_file_is_not_a_syntax_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.json");

        let result = lint_file(&missing, dir.path());
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E004");
        assert!(result.diagnostics[0].message.starts_with("unreadable file: file not found"));
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not valid json }}").unwrap();

        let result = lint_file(file.path(), file.path().parent().unwrap());
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn invalid_pattern() {
        assert_eq!(codes(json!({ "type": "String", "match": "([" })), vec!["E002"]);
        assert_eq!(codes(json!({ "type": "String", "match": 5 })), vec!["E002"]);
    }

    #[test]
    fn min_above_max() {
        assert_eq!(
            codes(json!({ "type": "Number", "min": 10, "max": 1 })),
            vec!["E003"]
        );
    }

    #[test]
    fn unknown_constraint_key() {
        let diagnostics = lint_spec(&json!([{ "key": { "type": "String", "valid": ["1"] } }]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "W001");
        assert_eq!(diagnostics[0].path, "/0/key/valid");
    }

    #[test]
    fn inert_constraints() {
        assert_eq!(codes(json!({ "type": "String", "min": 1 })), vec!["W002"]);
        assert_eq!(
            codes(json!({ "type": "Number", "disallowEmpty": true })),
            vec!["W002"]
        );
    }

    #[test]
    fn default_outside_enums() {
        assert_eq!(
            codes(json!({ "type": "String", "enums": ["a"], "default": "b" })),
            vec!["W003"]
        );
        assert_eq!(
            codes(json!({ "type": "String", "invalid": ["b"], "default": "b" })),
            vec!["W003"]
        );
    }

    #[test]
    fn field_named_type_is_walked_as_a_field() {
        let spec = json!({
            "geometry": {
                "type": { "type": "String", "min": 1 },
                "coordinates": [["Number"]]
            }
        });
        let diagnostics = lint_spec(&spec);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "/geometry/type/min");
    }

    #[test]
    fn lint_directory_counts() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), r#"{ "a": "String" }"#).unwrap();
        std::fs::write(
            dir.path().join("warn.json"),
            r#"{ "type": "String", "max": 3 }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("bad.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 3);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, 1);
        assert_eq!(result.warnings, 1);
        assert!(!result.is_ok());

        let strict = lint(dir.path(), true);
        assert_eq!(strict.failed, 2);
        assert_eq!(strict.passed, 1);
    }
}
