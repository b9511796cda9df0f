//! User accounts and their access keys.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{
    records, AnyKind, Descriptor, Field, FieldSet, IntegerKind, ListKind, NestedKind, Record,
    SchemaResult, StringKind,
};

/// One S3 key pair attached to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEntry {
    pub user: String,
    pub secret_key: String,
    pub access_key: String,
}

struct KeyEntryFields {
    user: Field<StringKind>,
    secret_key: Field<StringKind>,
    access_key: Field<StringKind>,
    descriptor: Descriptor,
}

impl KeyEntryFields {
    fn new() -> Self {
        let mut set = FieldSet::new("KeyEntry");
        Self {
            user: set.field("user", StringKind),
            secret_key: set.field("secret_key", StringKind),
            access_key: set.field("access_key", StringKind),
            descriptor: set.finish(),
        }
    }
}

static KEY_ENTRY: LazyLock<KeyEntryFields> = LazyLock::new(KeyEntryFields::new);

impl Record for KeyEntry {
    fn descriptor() -> &'static Descriptor {
        &KEY_ENTRY.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            user: KEY_ENTRY.user.deserialize(map)?,
            secret_key: KEY_ENTRY.secret_key.deserialize(map)?,
            access_key: KEY_ENTRY.access_key.deserialize(map)?,
        })
    }
}

/// A gateway user account.
///
/// `swift_keys`, `caps`, and `subusers` are stored raw: the client never
/// interprets them, only passes them through to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub display_name: String,
    pub user_id: String,
    pub email: String,
    pub keys: Vec<KeyEntry>,
    pub suspended: i64,
    pub max_buckets: i64,
    pub tenant: String,
    pub swift_keys: Value,
    pub caps: Value,
    pub subusers: Value,
}

struct UserFields {
    display_name: Field<StringKind>,
    user_id: Field<StringKind>,
    email: Field<StringKind>,
    keys: Field<ListKind<NestedKind<KeyEntry>>>,
    suspended: Field<IntegerKind>,
    max_buckets: Field<IntegerKind>,
    tenant: Field<StringKind>,
    swift_keys: Field<AnyKind>,
    caps: Field<AnyKind>,
    subusers: Field<AnyKind>,
    descriptor: Descriptor,
}

impl UserFields {
    fn new() -> Self {
        let mut set = FieldSet::new("User");
        Self {
            display_name: set.field("display_name", StringKind),
            user_id: set.field("user_id", StringKind),
            email: set.field("email", StringKind),
            keys: set.field("keys", records::<KeyEntry>()),
            suspended: set.field("suspended", IntegerKind),
            max_buckets: set.field("max_buckets", IntegerKind),
            tenant: set.field("tenant", StringKind),
            swift_keys: set.field("swift_keys", AnyKind),
            caps: set.field("caps", AnyKind),
            subusers: set.field("subusers", AnyKind),
            descriptor: set.finish(),
        }
    }
}

static USER: LazyLock<UserFields> = LazyLock::new(UserFields::new);

impl Record for User {
    fn descriptor() -> &'static Descriptor {
        &USER.descriptor
    }

    fn deserialize_fields(map: &Map<String, Value>) -> SchemaResult<Self> {
        Ok(Self {
            display_name: USER.display_name.deserialize(map)?,
            user_id: USER.user_id.deserialize(map)?,
            email: USER.email.deserialize(map)?,
            keys: USER.keys.deserialize(map)?,
            suspended: USER.suspended.deserialize(map)?,
            max_buckets: USER.max_buckets.deserialize(map)?,
            tenant: USER.tenant.deserialize(map)?,
            swift_keys: USER.swift_keys.deserialize(map)?,
            caps: USER.caps.deserialize(map)?,
            subusers: USER.subusers.deserialize(map)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::schema::{from_value, SchemaError};

    use super::*;

    fn user_body() -> Value {
        json!({
            "display_name": "Operations",
            "user_id": "ops",
            "email": "ops@example.com",
            "keys": [
                {"user": "ops", "secret_key": "s3cr3t", "access_key": "AK1"}
            ],
            "suspended": 0,
            "max_buckets": 1000,
            "tenant": "",
            "swift_keys": [],
            "caps": null,
            "subusers": []
        })
    }

    #[test]
    fn deserializes_a_full_user_response() {
        let user: User = from_value(&user_body()).unwrap();
        assert_eq!(user.user_id, "ops");
        assert_eq!(user.suspended, 0);
        assert_eq!(user.keys.len(), 1);
        assert_eq!(user.keys[0].access_key, "AK1");
        assert_eq!(user.caps, Value::Null);
    }

    #[test]
    fn stringified_counters_decode_like_native_ones() {
        let mut body = user_body();
        body["suspended"] = json!("0");
        body["max_buckets"] = json!("1000");

        let user: User = from_value(&body).unwrap();
        assert_eq!(user.suspended, 0);
        assert_eq!(user.max_buckets, 1000);
    }

    #[test]
    fn malformed_key_entry_fails_the_whole_user() {
        let mut body = user_body();
        body["keys"] = json!([{"user": "ops", "access_key": "AK1"}]);

        let err = from_value::<User>(&body).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { .. }));
        assert!(err.to_string().contains("KeyEntry.secret_key"));
    }

    #[test]
    fn unexpected_response_keys_are_rejected() {
        let mut body = user_body();
        body["op_mask"] = json!("read, write, delete");

        let err = from_value::<User>(&body).unwrap_err();
        assert_eq!(
            err,
            SchemaError::unrecognized_keys("User", vec!["op_mask".into()])
        );
    }
}
