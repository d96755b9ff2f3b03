//! Document store boundary
//!
//! The collaboration domain only needs four capabilities from its backing
//! store: equality lookups, record creation with a store-assigned id and
//! creation timestamp, point reads, and partial updates built from a small set
//! of field primitives. [`DocumentStore`] captures exactly that, so a hosted
//! backend, PostgreSQL, or an in-memory fake can sit behind the same manager.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sharekit_common::StoreError;

/// Identifier assigned by the store when a record is created
pub type RecordId = String;

/// Field map of a stored record
pub type Fields = serde_json::Map<String, Value>;

/// Field stamped with the store clock on every created record
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A record as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode the record into an entity, exposing the record id as `id`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            StoreError::InvalidData(format!("record {} could not be decoded: {}", self.id, e))
        })
    }
}

/// Conjunction of equality filters over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Whether a record's fields satisfy every filter
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }
}

/// Update primitive applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite the field
    Set(Value),
    /// Append each value not already present in the array
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of each value from the array
    ArrayRemove(Vec<Value>),
    /// Overwrite the field with the store's current time
    ServerTimestamp,
}

/// Ordered list of field updates applied to one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<(String, FieldUpdate)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FieldUpdate::Set(value.into()))
    }

    pub fn array_union<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(field, FieldUpdate::ArrayUnion(values))
    }

    pub fn array_remove<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(field, FieldUpdate::ArrayRemove(values))
    }

    pub fn server_timestamp(self, field: &str) -> Self {
        self.push(field, FieldUpdate::ServerTimestamp)
    }

    pub fn ops(&self) -> &[(String, FieldUpdate)] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn push(mut self, field: &str, update: FieldUpdate) -> Self {
        self.ops.push((field.to_string(), update));
        self
    }
}

/// Encode a store timestamp the way every backend writes it
pub fn timestamp_value(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Apply `update` to `fields` in order, using `now` for server timestamps.
///
/// A union or removal on a field that is missing (or not an array) treats it as
/// an empty array.
pub fn apply_updates(fields: &mut Fields, update: &Update, now: DateTime<Utc>) {
    for (field, op) in update.ops() {
        match op {
            FieldUpdate::Set(value) => {
                fields.insert(field.clone(), value.clone());
            }
            FieldUpdate::ServerTimestamp => {
                fields.insert(field.clone(), timestamp_value(now));
            }
            FieldUpdate::ArrayUnion(values) => {
                let mut items = take_array(fields, field);
                for value in values {
                    if !items.contains(value) {
                        items.push(value.clone());
                    }
                }
                fields.insert(field.clone(), Value::Array(items));
            }
            FieldUpdate::ArrayRemove(values) => {
                let mut items = take_array(fields, field);
                items.retain(|item| !values.contains(item));
                fields.insert(field.clone(), Value::Array(items));
            }
        }
    }
}

fn take_array(fields: &mut Fields, field: &str) -> Vec<Value> {
    match fields.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Store capability, used to target fault injection in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Lookup,
    Create,
    Get,
    Update,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lookup => write!(f, "lookup"),
            Self::Create => write!(f, "create"),
            Self::Get => write!(f, "get"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// External document store used by the collaboration domain
///
/// Implementations must be shareable across tasks. No operation is expected to
/// be atomic with any other; each single-record update is applied as a whole.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All records of `query.collection` matching every equality filter
    async fn lookup(&self, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Create a record with a store-assigned id, stamping [`CREATED_AT_FIELD`]
    async fn create_record(&self, collection: &str, fields: Fields)
        -> Result<RecordId, StoreError>;

    /// Fetch one record, `None` if absent
    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError>;

    /// Apply a partial update; fails with [`StoreError::MissingRecord`] if absent
    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        update: Update,
    ) -> Result<(), StoreError>;
}
