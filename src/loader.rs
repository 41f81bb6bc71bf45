//! Loading specifications and payloads from files, strings, and HTTP URLs.

use std::path::Path;

use crate::error::{CheckError, LoadError};
use crate::schema::Schema;
use crate::spec::Spec;
use crate::value::Value;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<serde_json::Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Parse a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_json_str(content: &str) -> Result<serde_json::Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Fetch a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_json_url(url: &str) -> Result<serde_json::Value, LoadError> {
    let network = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a JSON document from a file path or, with the `remote` feature,
/// a URL.
pub fn load_json_auto(source: &str) -> Result<serde_json::Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_json_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_json(Path::new(source))
    }
}

/// Load a specification from a JSON file.
pub fn load_spec(path: &Path) -> Result<Spec, LoadError> {
    load_json(path).map(|json| Spec::from_json(&json))
}

/// Parse a specification from JSON text.
pub fn load_spec_str(content: &str) -> Result<Spec, LoadError> {
    load_json_str(content).map(|json| Spec::from_json(&json))
}

/// Load a payload value from a JSON file.
pub fn load_value(path: &Path) -> Result<Value, LoadError> {
    load_json(path).map(Value::from)
}

/// Parse a payload value from JSON text.
pub fn load_value_str(content: &str) -> Result<Value, LoadError> {
    load_json_str(content).map(Value::from)
}

/// Validate a payload file against a specification source (path or URL).
///
/// # Errors
///
/// Returns `CheckError::Load` if either document can't be loaded, or
/// `CheckError::Invalid` if the payload fails validation.
pub fn check_file(spec_source: &str, payload: &Path) -> Result<Option<Value>, CheckError> {
    let schema = Schema::from_json(&load_json_auto(spec_source)?);
    let value = load_value(payload)?;
    Ok(schema.validate(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file() {
        let err = load_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_json() {
        let err = load_spec_str("{ not json").unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson { .. }));
    }

    #[test]
    fn url_detection() {
        assert!(is_url("https://example.com/spec.json"));
        assert!(is_url("http://localhost/spec.json"));
        assert!(!is_url("specs/user.json"));
    }

    #[test]
    fn check_file_validates_payload() {
        let mut spec = NamedTempFile::new().unwrap();
        writeln!(spec, r#"{{ "age": {{ "type": "Number", "min": 0 }} }}"#).unwrap();
        let mut payload = NamedTempFile::new().unwrap();
        writeln!(payload, r#"{{ "age": "42", "extra": true }}"#).unwrap();

        let out = check_file(spec.path().to_str().unwrap(), payload.path()).unwrap();
        assert_eq!(out.unwrap().to_json(), serde_json::json!({ "age": 42 }));
    }

    #[test]
    fn check_file_reports_invalid_payload() {
        let mut spec = NamedTempFile::new().unwrap();
        writeln!(spec, r#"{{ "age": "Number" }}"#).unwrap();
        let mut payload = NamedTempFile::new().unwrap();
        writeln!(payload, "{{}}").unwrap();

        let err = check_file(spec.path().to_str().unwrap(), payload.path()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("v.age is required"));
    }
}
