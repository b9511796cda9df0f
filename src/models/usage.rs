//! Usage statistics: per-user, per-bucket, per-operation-category traffic
//! counters.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{
    records, Descriptor, Field, FieldSet, IntegerKind, ListKind, NestedKind, Record, SchemaResult,
    StringKind,
};

/// Counters for one operation category (`put_obj`, `get_obj`, …) of one
/// bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub sent_bytes: i64,
    pub requests: i64,
    pub successful_requests: i64,
    pub received_bytes: i64,
}

struct CategoryFields {
    name: Field<StringKind>,
    sent_bytes: Field<IntegerKind>,
    requests: Field<IntegerKind>,
    successful_requests: Field<IntegerKind>,
    received_bytes: Field<IntegerKind>,
    descriptor: Descriptor,
}

impl CategoryFields {
    fn new() -> Self {
        let mut set = FieldSet::new("Category");
        Self {
            name: set.aliased("name", "category", StringKind),
            sent_bytes: set.aliased("sent_bytes", "bytes_sent", IntegerKind),
            requests: set.aliased("requests", "ops", IntegerKind),
            successful_requests: set.aliased("successful_requests", "successful_ops", IntegerKind),
            received_bytes: set.aliased("received_bytes", "bytes_received", IntegerKind),
            descriptor: set.finish(),
        }
    }
}

static CATEGORY: LazyLock<CategoryFields> = LazyLock::new(CategoryFields::new);

impl Record for Category {
    fn descriptor() -> &'static Descriptor {
        &CATEGORY.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            name: CATEGORY.name.deserialize(map)?,
            sent_bytes: CATEGORY.sent_bytes.deserialize(map)?,
            requests: CATEGORY.requests.deserialize(map)?,
            successful_requests: CATEGORY.successful_requests.deserialize(map)?,
            received_bytes: CATEGORY.received_bytes.deserialize(map)?,
        })
    }
}

/// Usage of one bucket within a reporting window, broken down by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketUsage {
    pub name: String,
    pub datetime: String,
    pub owner_id: String,
    pub timestamp: i64,
    pub categories: Vec<Category>,
}

struct BucketUsageFields {
    name: Field<StringKind>,
    datetime: Field<StringKind>,
    owner_id: Field<StringKind>,
    timestamp: Field<IntegerKind>,
    categories: Field<ListKind<NestedKind<Category>>>,
    descriptor: Descriptor,
}

impl BucketUsageFields {
    fn new() -> Self {
        let mut set = FieldSet::new("BucketUsage");
        Self {
            name: set.aliased("name", "bucket", StringKind),
            datetime: set.aliased("datetime", "time", StringKind),
            owner_id: set.aliased("owner_id", "owner", StringKind),
            timestamp: set.aliased("timestamp", "epoch", IntegerKind),
            categories: set.field("categories", records::<Category>()),
            descriptor: set.finish(),
        }
    }
}

static BUCKET_USAGE: LazyLock<BucketUsageFields> = LazyLock::new(BucketUsageFields::new);

impl Record for BucketUsage {
    fn descriptor() -> &'static Descriptor {
        &BUCKET_USAGE.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            name: BUCKET_USAGE.name.deserialize(map)?,
            datetime: BUCKET_USAGE.datetime.deserialize(map)?,
            owner_id: BUCKET_USAGE.owner_id.deserialize(map)?,
            timestamp: BUCKET_USAGE.timestamp.deserialize(map)?,
            categories: BUCKET_USAGE.categories.deserialize(map)?,
        })
    }
}

impl BucketUsage {
    /// Requests across all categories.
    pub fn requests(&self) -> i64 {
        self.categories.iter().map(|category| category.requests).sum()
    }

    /// Successful requests across all categories.
    pub fn successful_requests(&self) -> i64 {
        self.categories
            .iter()
            .map(|category| category.successful_requests)
            .sum()
    }

    /// Bytes sent to clients across all categories.
    pub fn sent_bytes(&self) -> i64 {
        self.categories.iter().map(|category| category.sent_bytes).sum()
    }

    /// Bytes received from clients across all categories.
    pub fn received_bytes(&self) -> i64 {
        self.categories
            .iter()
            .map(|category| category.received_bytes)
            .sum()
    }
}

/// Usage of all buckets of one user within a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEntry {
    pub user_id: String,
    pub buckets: Vec<BucketUsage>,
}

struct UsageEntryFields {
    user_id: Field<StringKind>,
    buckets: Field<ListKind<NestedKind<BucketUsage>>>,
    descriptor: Descriptor,
}

impl UsageEntryFields {
    fn new() -> Self {
        let mut set = FieldSet::new("UsageEntry");
        Self {
            user_id: set.aliased("user_id", "user", StringKind),
            buckets: set.field("buckets", records::<BucketUsage>()),
            descriptor: set.finish(),
        }
    }
}

static USAGE_ENTRY: LazyLock<UsageEntryFields> = LazyLock::new(UsageEntryFields::new);

impl Record for UsageEntry {
    fn descriptor() -> &'static Descriptor {
        &USAGE_ENTRY.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            user_id: USAGE_ENTRY.user_id.deserialize(map)?,
            buckets: USAGE_ENTRY.buckets.deserialize(map)?,
        })
    }
}

/// Top-level usage report of the `usage` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usage {
    pub entries: Vec<UsageEntry>,
}

struct UsageFields {
    entries: Field<ListKind<NestedKind<UsageEntry>>>,
    descriptor: Descriptor,
}

impl UsageFields {
    fn new() -> Self {
        let mut set = FieldSet::new("Usage");
        Self {
            entries: set.field("entries", records::<UsageEntry>()),
            descriptor: set.finish(),
        }
    }
}

static USAGE: LazyLock<UsageFields> = LazyLock::new(UsageFields::new);

impl Record for Usage {
    fn descriptor() -> &'static Descriptor {
        &USAGE.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            entries: USAGE.entries.deserialize(map)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::{from_value, SchemaError};

    use super::*;

    fn usage_body() -> Value {
        json!({
            "entries": [
                {
                    "user": "ops",
                    "buckets": [
                        {
                            "bucket": "backups",
                            "time": "2023-05-04 09:00:00.000000Z",
                            "owner": "ops",
                            "epoch": 1683190800,
                            "categories": [
                                {
                                    "category": "put_obj",
                                    "bytes_sent": 0,
                                    "ops": "20",
                                    "successful_ops": 18,
                                    "bytes_received": 4096
                                },
                                {
                                    "category": "get_obj",
                                    "bytes_sent": 8192,
                                    "ops": 7,
                                    "successful_ops": 7,
                                    "bytes_received": 0
                                }
                            ]
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn deserializes_a_usage_report() {
        let usage: Usage = from_value(&usage_body()).unwrap();
        assert_eq!(usage.entries.len(), 1);

        let entry = &usage.entries[0];
        assert_eq!(entry.user_id, "ops");
        assert_eq!(entry.buckets[0].timestamp, 1683190800);
        assert_eq!(entry.buckets[0].categories[0].name, "put_obj");
    }

    #[test]
    fn bucket_usage_sums_its_categories() {
        let usage: Usage = from_value(&usage_body()).unwrap();
        let bucket = &usage.entries[0].buckets[0];

        assert_eq!(bucket.requests(), 27);
        assert_eq!(bucket.successful_requests(), 25);
        assert_eq!(bucket.sent_bytes(), 8192);
        assert_eq!(bucket.received_bytes(), 4096);
    }

    #[test]
    fn empty_report_has_no_entries() {
        let usage: Usage = from_value(&json!({"entries": []})).unwrap();
        assert!(usage.entries.is_empty());
    }

    #[test]
    fn category_failure_propagates_to_the_top() {
        let mut body = usage_body();
        body["entries"][0]["buckets"][0]["categories"][1]["ops"] = json!("many");

        let err = from_value::<Usage>(&body).unwrap_err();
        assert_eq!(
            err,
            SchemaError::invalid_integer(
                &crate::schema::FieldPath::field("Category", "requests"),
                "many"
            )
        );
    }
}
