//! Field primitives: one typed extraction-and-validation rule per record
//! attribute.
//!
//! The gateway's admin API is inconsistent about primitive types: the same
//! logical field arrives as a native JSON value on one endpoint and as a
//! stringified primitive on another. Every kind therefore accepts its native
//! shape as-is and falls back to a kind-specific string coercion, so callers
//! never special-case individual responses.

use serde_json::{Map, Value};

use super::errors::{FieldPath, SchemaError, SchemaResult};

/// A unit of type coercion and validation for one attribute value.
///
/// `decode` turns a raw JSON value into the kind's output type, accepting the
/// native shape directly and parsing textual input through the kind's
/// string-coercion rule. `validate` runs after decoding and enforces semantic
/// constraints; the default implementation accepts everything.
pub trait FieldKind {
    type Output: Clone;

    /// Name of the native shape this kind accepts, for diagnostics.
    fn expected(&self) -> &'static str;

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<Self::Output>;

    fn validate(&self, _path: &FieldPath, _value: &Self::Output) -> SchemaResult<()> {
        Ok(())
    }

    /// Decode then validate. Composite kinds call this for their elements so
    /// nested validation hooks are never skipped.
    fn deserialize(&self, path: &FieldPath, value: &Value) -> SchemaResult<Self::Output> {
        let decoded = self.decode(path, value)?;
        self.validate(path, &decoded)?;
        Ok(decoded)
    }
}

/// A declared field of a record: qualified path, lookup key, optional
/// default, and the kind that decodes its value.
///
/// Fields are created through [`super::FieldSet`], which resolves the lookup
/// key (attribute alias if configured, else the field name) and enforces the
/// definition-time invariants.
pub struct Field<K: FieldKind> {
    path: FieldPath,
    key: &'static str,
    default: Option<K::Output>,
    kind: K,
}

impl<K: FieldKind> Field<K> {
    pub(crate) fn new(path: FieldPath, key: &'static str, kind: K) -> Self {
        Self {
            path,
            key,
            default: None,
            kind,
        }
    }

    /// Configures the value returned when the key is absent from the input.
    ///
    /// Any value of the output type is a valid default, including zero and
    /// the empty string; "no default" is represented structurally, not by a
    /// sentinel value.
    pub fn with_default(mut self, value: K::Output) -> Self {
        self.default = Some(value);
        self
    }

    /// Qualified name of this field.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Looks this field up in `map` and decodes it.
    ///
    /// An absent key yields the configured default, or `MissingField` when
    /// none is configured. A present key is decoded and validated by the
    /// field's kind.
    pub fn deserialize(&self, map: &Map<String, Value>) -> SchemaResult<K::Output> {
        match map.get(self.key) {
            Some(value) => self.kind.deserialize(&self.path, value),
            None => self
                .default
                .clone()
                .ok_or_else(|| SchemaError::missing_field(&self.path, self.key)),
        }
    }
}

/// UTF-8 string. No coercion beyond accepting the string itself.
#[derive(Debug, Clone, Copy)]
pub struct StringKind;

impl FieldKind for StringKind {
    type Output = String;

    fn expected(&self) -> &'static str {
        "string"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}

/// 64-bit signed integer; strings are parsed as decimal.
#[derive(Debug, Clone, Copy)]
pub struct IntegerKind;

impl FieldKind for IntegerKind {
    type Output = i64;

    fn expected(&self) -> &'static str {
        "integer"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<i64> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| SchemaError::type_mismatch(path, self.expected(), value)),
            Value::String(s) => s
                .parse::<i64>()
                .map_err(|_| SchemaError::invalid_integer(path, s)),
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}

/// Boolean; accepts exactly the textual literals `"True"` and `"False"`,
/// which is the form the gateway emits for stringified flags.
#[derive(Debug, Clone, Copy)]
pub struct BooleanKind;

impl FieldKind for BooleanKind {
    type Output = bool;

    fn expected(&self) -> &'static str {
        "boolean"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<bool> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) => match s.as_str() {
                "True" => Ok(true),
                "False" => Ok(false),
                _ => Err(SchemaError::invalid_boolean(path, s)),
            },
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}

/// String carrying an email address. Validation is deliberately shallow: the
/// gateway already rejects malformed addresses, this only catches obviously
/// wrong payloads.
#[derive(Debug, Clone, Copy)]
pub struct EmailKind;

impl FieldKind for EmailKind {
    type Output = String;

    fn expected(&self) -> &'static str {
        "string"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<String> {
        StringKind.decode(path, value)
    }

    fn validate(&self, path: &FieldPath, value: &String) -> SchemaResult<()> {
        if value.contains('@') {
            Ok(())
        } else {
            Err(SchemaError::validation(
                path,
                format!("not an email address: {value:?}"),
            ))
        }
    }
}

/// Passthrough: the raw JSON value, no coercion, no validation. Used for
/// attributes the client stores but never interprets.
#[derive(Debug, Clone, Copy)]
pub struct AnyKind;

impl FieldKind for AnyKind {
    type Output = Value;

    fn expected(&self) -> &'static str {
        "any value"
    }

    fn decode(&self, _path: &FieldPath, value: &Value) -> SchemaResult<Value> {
        Ok(value.clone())
    }
}
