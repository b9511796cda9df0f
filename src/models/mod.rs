//! Domain records of the admin API, declared on top of the
//! [`crate::schema`] engine.
//!
//! Every record is created fresh by one deserialization call and carries no
//! mutation API; derived aggregates are pure functions of validated state.

mod bucket;
mod usage;
mod user;

pub use bucket::{Bucket, BucketSize};
pub use usage::{BucketUsage, Category, Usage, UsageEntry};
pub use user::{KeyEntry, User};

use serde_json::Value;

use crate::schema::{from_value_as, records, SchemaResult};

/// Deserializes the bare sequence of buckets returned by the `bucket` stats
/// endpoint.
pub fn bucket_list(value: &Value) -> SchemaResult<Vec<Bucket>> {
    from_value_as("BucketList", &records::<Bucket>(), value)
}

/// Deserializes the bare sequence of key entries returned by the key
/// subresource endpoints.
pub fn key_entry_list(value: &Value) -> SchemaResult<Vec<KeyEntry>> {
    from_value_as("KeyEntryList", &records::<KeyEntry>(), value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::SchemaError;

    use super::*;

    #[test]
    fn key_entry_list_deserializes_each_element() {
        let keys = key_entry_list(&json!([
            {"user": "ops", "secret_key": "a", "access_key": "AK1"},
            {"user": "ops", "secret_key": "b", "access_key": "AK2"},
        ]))
        .unwrap();
        assert_eq!(keys[1].access_key, "AK2");
    }

    #[test]
    fn bucket_list_rejects_a_mapping_body() {
        let err = bucket_list(&json!({"bucket": "backups"})).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
        assert!(err.to_string().starts_with("BucketList:"));
    }
}
