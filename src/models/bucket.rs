//! Buckets and their per-pool size statistics.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{
    dict_of, nested, AnyKind, Descriptor, DictKind, Field, FieldSet, IntegerKind, NestedKind,
    Record, SchemaResult, StringKind,
};

/// Placeholder pool key the gateway emits alongside real pools; its object
/// count is an artifact, see http://tracker.ceph.com/issues/37942.
const PLACEHOLDER_POOL: &str = "rgw.none";

/// Size statistics of one pool backing a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSize {
    pub size_kb_actual: i64,
    pub size_kb: i64,
    pub num_objects: i64,
}

struct BucketSizeFields {
    size_kb_actual: Field<IntegerKind>,
    size_kb: Field<IntegerKind>,
    num_objects: Field<IntegerKind>,
    descriptor: Descriptor,
}

impl BucketSizeFields {
    fn new() -> Self {
        let mut set = FieldSet::new("BucketSize");
        Self {
            size_kb_actual: set.field("size_kb_actual", IntegerKind),
            size_kb: set.field("size_kb", IntegerKind),
            num_objects: set.field("num_objects", IntegerKind),
            descriptor: set.finish(),
        }
    }
}

static BUCKET_SIZE: LazyLock<BucketSizeFields> = LazyLock::new(BucketSizeFields::new);

impl Record for BucketSize {
    fn descriptor() -> &'static Descriptor {
        &BUCKET_SIZE.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            size_kb_actual: BUCKET_SIZE.size_kb_actual.deserialize(map)?,
            size_kb: BUCKET_SIZE.size_kb.deserialize(map)?,
            num_objects: BUCKET_SIZE.num_objects.deserialize(map)?,
        })
    }
}

/// A bucket as reported by the `bucket` stats endpoint.
///
/// `size` maps pool keys (`rgw.main`, `rgw.multimeta`, …) to their
/// statistics; the aggregate accessors sum across it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub owner: String,
    pub size: BTreeMap<String, BucketSize>,
    pub zonegroup_id: String,
    pub marker: String,
    pub id: String,
    pub master_ver: String,
    pub bucket_quota: Value,
    pub ver: String,
    pub mtime: String,
    pub max_marker: String,
}

struct BucketFields {
    name: Field<StringKind>,
    owner: Field<StringKind>,
    size: Field<DictKind<StringKind, NestedKind<BucketSize>>>,
    zonegroup_id: Field<StringKind>,
    marker: Field<StringKind>,
    id: Field<StringKind>,
    master_ver: Field<StringKind>,
    bucket_quota: Field<AnyKind>,
    ver: Field<StringKind>,
    mtime: Field<StringKind>,
    max_marker: Field<StringKind>,
    descriptor: Descriptor,
}

impl BucketFields {
    fn new() -> Self {
        let mut set = FieldSet::new("Bucket");
        Self {
            name: set.aliased("name", "bucket", StringKind),
            owner: set.field("owner", StringKind),
            size: set.aliased("size", "usage", dict_of(StringKind, nested::<BucketSize>())),
            zonegroup_id: set.aliased("zonegroup_id", "zonegroup", StringKind),
            marker: set.field("marker", StringKind),
            id: set.field("id", StringKind),
            master_ver: set.field("master_ver", StringKind),
            bucket_quota: set.field("bucket_quota", AnyKind),
            ver: set.field("ver", StringKind),
            mtime: set.field("mtime", StringKind),
            max_marker: set.field("max_marker", StringKind),
            descriptor: set.finish(),
        }
    }
}

static BUCKET: LazyLock<BucketFields> = LazyLock::new(BucketFields::new);

impl Record for Bucket {
    fn descriptor() -> &'static Descriptor {
        &BUCKET.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            name: BUCKET.name.deserialize(map)?,
            owner: BUCKET.owner.deserialize(map)?,
            size: BUCKET.size.deserialize(map)?,
            zonegroup_id: BUCKET.zonegroup_id.deserialize(map)?,
            marker: BUCKET.marker.deserialize(map)?,
            id: BUCKET.id.deserialize(map)?,
            master_ver: BUCKET.master_ver.deserialize(map)?,
            bucket_quota: BUCKET.bucket_quota.deserialize(map)?,
            ver: BUCKET.ver.deserialize(map)?,
            mtime: BUCKET.mtime.deserialize(map)?,
            max_marker: BUCKET.max_marker.deserialize(map)?,
        })
    }
}

impl Bucket {
    /// Total on-disk size in kB, summed across all pools.
    pub fn size_kb_actual(&self) -> i64 {
        self.size.values().map(|size| size.size_kb_actual).sum()
    }

    /// Total logical size in kB, summed across all pools.
    pub fn size_kb(&self) -> i64 {
        self.size.values().map(|size| size.size_kb).sum()
    }

    /// Total object count, summed across all pools except the `rgw.none`
    /// placeholder entry.
    pub fn num_objects(&self) -> i64 {
        self.size
            .iter()
            .filter(|(pool, _)| pool.as_str() != PLACEHOLDER_POOL)
            .map(|(_, size)| size.num_objects)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::{from_value, SchemaError};

    use super::*;

    fn bucket_body() -> Value {
        json!({
            "bucket": "backups",
            "owner": "ops",
            "usage": {
                "rgw.main": {"size_kb_actual": 1024, "size_kb": 1000, "num_objects": 12},
                "rgw.multimeta": {"size_kb_actual": "8", "size_kb": "4", "num_objects": "3"},
                "rgw.none": {"size_kb_actual": 0, "size_kb": 0, "num_objects": 7}
            },
            "zonegroup": "default",
            "marker": "m-1",
            "id": "b-1",
            "master_ver": "0",
            "bucket_quota": {"enabled": false, "max_size_kb": -1, "max_objects": -1},
            "ver": "0#42",
            "mtime": "2023-05-04 09:00:00.000000Z",
            "max_marker": "0#"
        })
    }

    #[test]
    fn deserializes_bucket_stats() {
        let bucket: Bucket = from_value(&bucket_body()).unwrap();
        assert_eq!(bucket.name, "backups");
        assert_eq!(bucket.zonegroup_id, "default");
        assert_eq!(bucket.size.len(), 3);
        assert_eq!(bucket.size["rgw.multimeta"].num_objects, 3);
    }

    #[test]
    fn object_count_excludes_the_placeholder_pool() {
        let bucket: Bucket = from_value(&bucket_body()).unwrap();
        assert_eq!(bucket.num_objects(), 15);
    }

    #[test]
    fn size_sums_include_every_pool() {
        let bucket: Bucket = from_value(&bucket_body()).unwrap();
        assert_eq!(bucket.size_kb_actual(), 1032);
        assert_eq!(bucket.size_kb(), 1004);
    }

    #[test]
    fn empty_usage_yields_zero_aggregates() {
        let mut body = bucket_body();
        body["usage"] = json!({});

        let bucket: Bucket = from_value(&body).unwrap();
        assert_eq!(bucket.num_objects(), 0);
        assert_eq!(bucket.size_kb(), 0);
    }

    #[test]
    fn usage_must_be_a_mapping() {
        let mut body = bucket_body();
        body["usage"] = json!([]);

        let err = from_value::<Bucket>(&body).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
        assert!(err.to_string().contains("Bucket.size"));
    }

    #[test]
    fn name_is_read_from_the_bucket_key() {
        let mut body = bucket_body();
        body.as_object_mut().unwrap().remove("bucket");
        body["name"] = json!("backups");

        // The logical field name is no substitute for the aliased key.
        let err = from_value::<Bucket>(&body).unwrap_err();
        assert_eq!(
            err,
            SchemaError::missing_field(&crate::schema::FieldPath::field("Bucket", "name"), "bucket")
        );
    }
}
