//! Declarative deserialization engine.
//!
//! Converts loosely-typed JSON response bodies into strongly validated domain
//! records:
//!
//! - Field kinds coerce one attribute each, tolerating the API's mix of
//!   native and stringified primitives.
//! - Composite kinds (list, dict, nested record, any) recurse through
//!   structured values.
//! - The record engine deserializes a whole mapping, with strict detection of
//!   keys no declared field consumes.
//!
//! # Design principles
//!
//! - Schemas are built once per record type and immutable afterwards.
//! - Deserialization is a pure function of its input; replays are safe.
//! - Fail fast: the first error wins, no partial records.

mod composite;
mod errors;
mod fields;
mod record;

pub use composite::{dict_of, list_of, nested, records, DictKind, ListKind, NestedKind};
pub use errors::{FieldPath, SchemaError, SchemaResult};
pub use fields::{AnyKind, BooleanKind, EmailKind, Field, FieldKind, IntegerKind, StringKind};
pub use record::{
    from_value, from_value_as, from_value_with, Descriptor, FieldSet, Record, UnknownKeys,
};
