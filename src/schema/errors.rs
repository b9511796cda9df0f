//! Error types for the deserialization engine.
//!
//! Every error carries the qualified path of the field it concerns
//! (`Record.field`, extended with `[index]` / `[key]` inside composites) and a
//! rendering of the offending raw value, so callers can surface a precise
//! diagnostic without re-inspecting the input.
//!
//! Deserialization is fail-fast: the first error aborts the enclosing record.
//! Errors are never aggregated and this layer never retries.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result type for deserialization operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Qualified name of a field, used in diagnostics.
///
/// A path starts at the record type (`User.keys`) and is extended while
/// descending into composites: `User.keys[1]`, `Bucket.size["rgw.main"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path for a top-level value deserialized outside any record.
    pub fn root(label: &str) -> Self {
        Self(label.to_owned())
    }

    /// Path for a named field of a record type.
    pub fn field(record: &str, name: &str) -> Self {
        Self(format!("{record}.{name}"))
    }

    /// Path of an element inside a sequence at this path.
    pub fn element(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Path of an entry inside a mapping at this path.
    pub fn entry(&self, key: &str) -> Self {
        Self(format!("{}[{:?}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced while deserializing a raw JSON value into a domain record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Required key absent from the input mapping and no default configured.
    #[error("{field}: no value for key '{key}' and no default is configured")]
    MissingField { field: FieldPath, key: String },

    /// Value shape matches neither the expected native type nor a coercible
    /// string/sequence/mapping.
    #[error("{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: FieldPath,
        expected: &'static str,
        actual: String,
    },

    /// Textual value that does not parse as a decimal integer.
    #[error("{field}: invalid integer {value:?}")]
    InvalidInteger { field: FieldPath, value: String },

    /// Textual value that is neither `"True"` nor `"False"`.
    #[error("{field}: invalid boolean {value:?}")]
    InvalidBoolean { field: FieldPath, value: String },

    /// Structurally sound value failing a field's semantic constraint.
    #[error("{field}: {message}")]
    Validation { field: FieldPath, message: String },

    /// Top-level input to record deserialization is not a mapping.
    #[error("{record}: expected a mapping, got {actual}")]
    NotAMapping { record: &'static str, actual: String },

    /// Strict mode found raw keys not consumed by any declared field.
    #[error("{record}: unrecognized keys: {}", .keys.join(", "))]
    UnrecognizedKeys {
        record: &'static str,
        keys: Vec<String>,
    },
}

impl SchemaError {
    pub fn missing_field(field: &FieldPath, key: &str) -> Self {
        Self::MissingField {
            field: field.clone(),
            key: key.to_owned(),
        }
    }

    pub fn type_mismatch(field: &FieldPath, expected: &'static str, actual: &Value) -> Self {
        Self::TypeMismatch {
            field: field.clone(),
            expected,
            actual: render_value(actual),
        }
    }

    pub fn invalid_integer(field: &FieldPath, value: &str) -> Self {
        Self::InvalidInteger {
            field: field.clone(),
            value: value.to_owned(),
        }
    }

    pub fn invalid_boolean(field: &FieldPath, value: &str) -> Self {
        Self::InvalidBoolean {
            field: field.clone(),
            value: value.to_owned(),
        }
    }

    pub fn validation(field: &FieldPath, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.clone(),
            message: message.into(),
        }
    }

    pub fn not_a_mapping(record: &'static str, actual: &Value) -> Self {
        Self::NotAMapping {
            record,
            actual: render_value(actual),
        }
    }

    pub fn unrecognized_keys(record: &'static str, keys: Vec<String>) -> Self {
        Self::UnrecognizedKeys { record, keys }
    }
}

/// Returns the JSON type name of a value, for diagnostics.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_f64() {
                "float"
            } else {
                "integer"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Renders a value as `<type> <literal>`, truncated so pathological inputs do
/// not flood logs.
fn render_value(value: &Value) -> String {
    const LIMIT: usize = 60;

    let literal = value.to_string();
    let mut rendered = format!("{} {}", json_type_name(value), literal);
    if rendered.chars().count() > LIMIT {
        rendered = rendered.chars().take(LIMIT).collect();
        rendered.push('…');
    }
    rendered
}
