//! In-memory document store
//!
//! Backs tests and local sessions without a database. Records are kept per
//! collection in id order, so lookups return a stable order. Failures can be
//! injected per operation to exercise the partial-failure behavior of the
//! multi-step collaboration operations.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sharekit_common::StoreError;
use uuid::Uuid;

use super::store::{
    apply_updates, timestamp_value, DocumentStore, Fields, Query, Record, RecordId,
    StoreOperation, Update, CREATED_AT_FIELD,
};

type Collections = HashMap<String, BTreeMap<RecordId, Fields>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FailureKey {
    operation: StoreOperation,
    collection: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
    failures: Arc<Mutex<HashMap<FailureKey, usize>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record under a caller-chosen id, replacing any existing one
    pub fn insert_record(&self, collection: &str, id: &str, fields: Fields) {
        if let Ok(mut collections) = self.collections.lock() {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
    }

    /// Snapshot of every record in a collection, in id order
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.collections
            .lock()
            .map(|collections| {
                collections
                    .get(collection)
                    .map(|records| {
                        records
                            .iter()
                            .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    pub fn record_count(&self, collection: &str) -> usize {
        self.records(collection).len()
    }

    /// Fail the next call of `operation`, whatever collection it targets
    pub fn fail_next(&self, operation: StoreOperation) {
        self.arm(FailureKey {
            operation,
            collection: None,
        });
    }

    /// Fail the next call of `operation` against `collection`
    pub fn fail_next_in(&self, operation: StoreOperation, collection: &str) {
        self.arm(FailureKey {
            operation,
            collection: Some(collection.to_string()),
        });
    }

    fn arm(&self, key: FailureKey) {
        if let Ok(mut failures) = self.failures.lock() {
            *failures.entry(key).or_insert(0) += 1;
        }
    }

    fn check_failure(&self, operation: StoreOperation, collection: &str) -> Result<(), StoreError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| StoreError::Backend("failure table lock poisoned".to_string()))?;

        let keys = [
            FailureKey {
                operation,
                collection: Some(collection.to_string()),
            },
            FailureKey {
                operation,
                collection: None,
            },
        ];

        for key in keys {
            if let Some(remaining) = failures.get_mut(&key) {
                *remaining -= 1;
                if *remaining == 0 {
                    failures.remove(&key);
                }
                return Err(StoreError::Unavailable(format!(
                    "injected {} failure on {}",
                    operation, collection
                )));
            }
        }

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn lookup(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.check_failure(StoreOperation::Lookup, &query.collection)?;

        let collections = self.lock()?;
        let records = collections
            .get(&query.collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(records)
    }

    async fn create_record(
        &self,
        collection: &str,
        mut fields: Fields,
    ) -> Result<RecordId, StoreError> {
        self.check_failure(StoreOperation::Create, collection)?;

        let id = Uuid::new_v4().simple().to_string();
        fields.insert(CREATED_AT_FIELD.to_string(), timestamp_value(Utc::now()));

        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        Ok(id)
    }

    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        self.check_failure(StoreOperation::Get, collection)?;

        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(id))
            .map(|fields| Record::new(id, fields.clone())))
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        update: Update,
    ) -> Result<(), StoreError> {
        self.check_failure(StoreOperation::Update, collection)?;

        let mut collections = self.lock()?;
        let fields = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::missing(collection, id))?;

        apply_updates(fields, &update, Utc::now());
        Ok(())
    }
}
