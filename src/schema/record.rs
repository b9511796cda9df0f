//! Record engine: ordered field declarations and mapping deserialization.
//!
//! Each domain record type declares its fields once through a [`FieldSet`],
//! inside a lazily initialized static. The resulting [`Descriptor`] is
//! immutable and shared read-only by every deserialization call, so calls are
//! pure, independent, and safe to run concurrently or to replay.

use serde_json::{Map, Value};

use super::errors::{FieldPath, SchemaError, SchemaResult};
use super::fields::{Field, FieldKind};

/// Handling of raw keys not consumed by any declared field.
///
/// `Deny` (the default) fails with [`SchemaError::UnrecognizedKeys`], which
/// catches schema drift against the remote API's actual response shape.
/// Nested records are always deserialized with `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeys {
    Deny,
    Allow,
}

#[derive(Debug)]
struct DeclaredField {
    name: &'static str,
    key: &'static str,
}

/// Immutable schema of one record type: its name and the ordered field table.
///
/// Declaration order is preserved for display and debugging only; lookups are
/// by key.
#[derive(Debug)]
pub struct Descriptor {
    record: &'static str,
    fields: Vec<DeclaredField>,
}

impl Descriptor {
    /// Record type name used in diagnostics.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    fn consumes(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.key == key)
    }

    fn unconsumed_keys(&self, map: &Map<String, Value>) -> Vec<String> {
        map.keys()
            .filter(|key| !self.consumes(key))
            .cloned()
            .collect()
    }
}

/// Builder assembling the field table of one record type.
///
/// Registration resolves each field's lookup key (attribute alias if given,
/// else the name) and enforces the definition-time invariants by panicking:
/// an alias equal to the field name is redundant, and duplicate names or keys
/// would make lookups ambiguous. Schemas are declared in static initializers,
/// so violations surface the first time the schema is touched.
pub struct FieldSet {
    record: &'static str,
    fields: Vec<DeclaredField>,
}

impl FieldSet {
    pub fn new(record: &'static str) -> Self {
        Self {
            record,
            fields: Vec::new(),
        }
    }

    /// Declares a field looked up under its own name.
    pub fn field<K: FieldKind>(&mut self, name: &'static str, kind: K) -> Field<K> {
        self.declare(name, name, kind)
    }

    /// Declares a field whose value is read from `attribute` instead of
    /// `name`.
    ///
    /// # Panics
    ///
    /// Panics if `attribute` equals `name`.
    pub fn aliased<K: FieldKind>(
        &mut self,
        name: &'static str,
        attribute: &'static str,
        kind: K,
    ) -> Field<K> {
        assert!(
            attribute != name,
            "{}.{name}: attribute alias must differ from the field name",
            self.record
        );
        self.declare(name, attribute, kind)
    }

    fn declare<K: FieldKind>(&mut self, name: &'static str, key: &'static str, kind: K) -> Field<K> {
        assert!(
            self.fields.iter().all(|field| field.name != name),
            "{}.{name}: duplicate field name",
            self.record
        );
        assert!(
            self.fields.iter().all(|field| field.key != key),
            "{}.{name}: lookup key '{key}' already consumed by another field",
            self.record
        );
        self.fields.push(DeclaredField { name, key });
        Field::new(FieldPath::field(self.record, name), key, kind)
    }

    /// Freezes the field table.
    pub fn finish(self) -> Descriptor {
        Descriptor {
            record: self.record,
            fields: self.fields,
        }
    }
}

/// A domain record type deserializable from a raw JSON mapping.
///
/// Implementations declare their schema once (a `FieldSet` run inside a
/// `LazyLock` static) and construct themselves field by field in
/// `deserialize_fields`. Callers go through [`from_value`]; the trait methods
/// are plumbing.
pub trait Record: Sized + Clone {
    /// The record's immutable schema.
    fn descriptor() -> &'static Descriptor;

    /// Deserializes every declared field from the raw mapping, fail-fast.
    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self>;
}

/// Deserializes a record strictly: unrecognized raw keys are rejected.
pub fn from_value<R: Record>(value: &Value) -> SchemaResult<R> {
    from_value_with(value, UnknownKeys::Deny)
}

/// Deserializes a record with explicit unknown-key handling.
///
/// Field-level failures take precedence over the unknown-key check, and any
/// failure aborts the whole record; no partial instances are produced.
pub fn from_value_with<R: Record>(value: &Value, unknown: UnknownKeys) -> SchemaResult<R> {
    let descriptor = R::descriptor();
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::not_a_mapping(descriptor.record(), value))?;

    let record = R::deserialize_fields(map)?;

    if unknown == UnknownKeys::Deny {
        let unconsumed = descriptor.unconsumed_keys(map);
        if !unconsumed.is_empty() {
            return Err(SchemaError::unrecognized_keys(descriptor.record(), unconsumed));
        }
    }

    Ok(record)
}

/// Deserializes a top-level value through a standalone kind, for endpoints
/// whose body is a bare sequence or mapping rather than a record.
pub fn from_value_as<K: FieldKind>(
    label: &'static str,
    kind: &K,
    value: &Value,
) -> SchemaResult<K::Output> {
    kind.deserialize(&FieldPath::root(label), value)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::json;

    use super::super::composite::records;
    use super::super::fields::{IntegerKind, StringKind};
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        id: String,
        count: i64,
        label: String,
    }

    struct ProbeFields {
        id: Field<StringKind>,
        count: Field<IntegerKind>,
        label: Field<StringKind>,
        descriptor: Descriptor,
    }

    impl ProbeFields {
        fn new() -> Self {
            let mut set = FieldSet::new("Probe");
            Self {
                id: set.field("id", StringKind),
                count: set.aliased("count", "num", IntegerKind),
                label: set.field("label", StringKind).with_default(String::new()),
                descriptor: set.finish(),
            }
        }
    }

    static PROBE: LazyLock<ProbeFields> = LazyLock::new(ProbeFields::new);

    impl Record for Probe {
        fn descriptor() -> &'static Descriptor {
            &PROBE.descriptor
        }

        fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
            Ok(Self {
                id: PROBE.id.deserialize(map)?,
                count: PROBE.count.deserialize(map)?,
                label: PROBE.label.deserialize(map)?,
            })
        }
    }

    #[test]
    fn deserializes_a_complete_mapping() {
        let probe: Probe = from_value(&json!({"id": "p1", "num": 3, "label": "x"})).unwrap();
        assert_eq!(
            probe,
            Probe {
                id: "p1".into(),
                count: 3,
                label: "x".into()
            }
        );
    }

    #[test]
    fn alias_reads_the_attribute_key_not_the_name() {
        let probe: Probe = from_value(&json!({"id": "p1", "num": 3})).unwrap();
        assert_eq!(probe.count, 3);

        // The logical name is not consulted, and in strict mode its presence
        // in the input is itself an error.
        let err = from_value::<Probe>(&json!({"id": "p1", "num": 3, "count": 9})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::unrecognized_keys("Probe", vec!["count".into()])
        );
    }

    #[test]
    fn non_mapping_input_is_rejected() {
        let err = from_value::<Probe>(&json!(["id"])).unwrap_err();
        assert!(matches!(err, SchemaError::NotAMapping { record: "Probe", .. }));
    }

    #[test]
    fn strict_mode_rejects_unconsumed_keys() {
        let err = from_value::<Probe>(&json!({"id": "p1", "num": 3, "stray": 0})).unwrap_err();
        assert_eq!(
            err,
            SchemaError::unrecognized_keys("Probe", vec!["stray".into()])
        );
    }

    #[test]
    fn lenient_mode_ignores_unconsumed_keys() {
        let probe: Probe =
            from_value_with(&json!({"id": "p1", "num": 3, "stray": 0}), UnknownKeys::Allow)
                .unwrap();
        assert_eq!(probe.count, 3);
    }

    #[test]
    fn field_errors_take_precedence_over_unknown_keys() {
        let err = from_value::<Probe>(&json!({"num": 3, "stray": 0})).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { .. }));
    }

    #[test]
    fn defaults_fill_absent_keys() {
        let probe: Probe = from_value(&json!({"id": "p1", "num": 0})).unwrap();
        assert_eq!(probe.label, "");
    }

    #[test]
    fn descriptor_preserves_declaration_order() {
        let names: Vec<_> = Probe::descriptor().field_names().collect();
        assert_eq!(names, vec!["id", "count", "label"]);
    }

    #[test]
    fn top_level_sequences_deserialize_through_a_kind() {
        let probes = from_value_as(
            "ProbeList",
            &records::<Probe>(),
            &json!([{"id": "a", "num": 1}, {"id": "b", "num": 2}]),
        )
        .unwrap();
        assert_eq!(probes.len(), 2);
        assert_eq!(probes[1].id, "b");

        let err = from_value_as("ProbeList", &records::<Probe>(), &json!({})).unwrap_err();
        assert!(err.to_string().starts_with("ProbeList:"));
    }

    #[test]
    #[should_panic(expected = "attribute alias must differ")]
    fn alias_equal_to_name_panics_at_definition_time() {
        let mut set = FieldSet::new("Broken");
        let _ = set.aliased("bucket", "bucket", StringKind);
    }

    #[test]
    #[should_panic(expected = "duplicate field name")]
    fn duplicate_field_name_panics_at_definition_time() {
        let mut set = FieldSet::new("Broken");
        let _ = set.field("id", StringKind);
        let _ = set.field("id", StringKind);
    }

    #[test]
    #[should_panic(expected = "already consumed")]
    fn duplicate_lookup_key_panics_at_definition_time() {
        let mut set = FieldSet::new("Broken");
        let _ = set.field("bucket", StringKind);
        let _ = set.aliased("name", "bucket", StringKind);
    }
}
