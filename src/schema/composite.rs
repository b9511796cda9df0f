//! Composite field kinds: values composed of other kinds or records.
//!
//! - [`ListKind`]: ordered sequence, element-wise deserialization.
//! - [`DictKind`]: mapping with independently deserialized keys and values.
//! - [`NestedKind`]: recursive deserialization of an embedded record.
//!
//! Element failures abort the whole composite; there are no partial results.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde_json::Value;

use super::errors::{FieldPath, SchemaError, SchemaResult};
use super::fields::FieldKind;
use super::record::{from_value, Record};

/// Ordered sequence of values deserialized through `E`.
#[derive(Debug, Clone, Copy)]
pub struct ListKind<E> {
    element: E,
}

/// Sequence whose elements decode through `element`.
pub fn list_of<E: FieldKind>(element: E) -> ListKind<E> {
    ListKind { element }
}

/// Sequence of embedded records, the common list shape of the admin API.
pub fn records<R: Record>() -> ListKind<NestedKind<R>> {
    list_of(nested())
}

impl<E: FieldKind> FieldKind for ListKind<E> {
    type Output = Vec<E::Output>;

    fn expected(&self) -> &'static str {
        "sequence"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<Vec<E::Output>> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, element)| self.element.deserialize(&path.element(index), element))
                .collect(),
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}

/// Mapping whose keys and values are independently deserialized.
///
/// Raw keys are always JSON strings; they are fed to the key kind as string
/// values, so coercing kinds (e.g. [`super::IntegerKind`]) apply their usual
/// parsing. The result is ordered by key; the input's entry order carries no
/// meaning.
#[derive(Debug, Clone, Copy)]
pub struct DictKind<K, V> {
    key: K,
    value: V,
}

/// Mapping whose keys decode through `key` and values through `value`.
pub fn dict_of<K: FieldKind, V: FieldKind>(key: K, value: V) -> DictKind<K, V> {
    DictKind { key, value }
}

impl<K, V> FieldKind for DictKind<K, V>
where
    K: FieldKind,
    K::Output: Ord,
    V: FieldKind,
{
    type Output = BTreeMap<K::Output, V::Output>;

    fn expected(&self) -> &'static str {
        "mapping"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<Self::Output> {
        match value {
            Value::Object(entries) => entries
                .iter()
                .map(|(raw_key, raw_value)| {
                    let entry_path = path.entry(raw_key);
                    let key = self
                        .key
                        .deserialize(&entry_path, &Value::String(raw_key.clone()))?;
                    let value = self.value.deserialize(&entry_path, raw_value)?;
                    Ok((key, value))
                })
                .collect(),
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}

/// An embedded record, deserialized recursively through its own schema.
///
/// Nested records are always strict: unknown keys inside them are rejected
/// regardless of how the top-level call was configured.
#[derive(Debug, Clone, Copy)]
pub struct NestedKind<R> {
    _record: PhantomData<R>,
}

/// Embedded record deserialized via `R`'s schema.
pub fn nested<R: Record>() -> NestedKind<R> {
    NestedKind {
        _record: PhantomData,
    }
}

impl<R: Record> FieldKind for NestedKind<R> {
    type Output = R;

    fn expected(&self) -> &'static str {
        "mapping"
    }

    fn decode(&self, path: &FieldPath, value: &Value) -> SchemaResult<R> {
        match value {
            Value::Object(_) => from_value(value),
            other => Err(SchemaError::type_mismatch(path, self.expected(), other)),
        }
    }
}
