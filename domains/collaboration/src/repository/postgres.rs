//! PostgreSQL document store
//!
//! Every collection lives in one `documents` table keyed by `(collection, id)`
//! with the record fields in a JSONB column. Equality lookups use JSONB
//! containment; updates lock the row and apply the field primitives in Rust,
//! so a single-record update is atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sharekit_common::StoreError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{
    apply_updates, DocumentStore, Fields, Query, Record, RecordId, Update, CREATED_AT_FIELD,
};

const CREATE_DOCUMENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        fields JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (collection, id)
    )
"#;

const CREATE_FIELDS_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS documents_fields_idx
    ON documents USING GIN (fields jsonb_path_ops)
"#;

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the documents table exists
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the documents table and its lookup index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_DOCUMENTS_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_FIELDS_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    fn filter_document(query: &Query) -> Value {
        let filter: Fields = query.filters.iter().cloned().collect();
        Value::Object(filter)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn lookup(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let rows: Vec<(String, Json<Fields>)> = sqlx::query_as(
            r#"
            SELECT id, fields
            FROM documents
            WHERE collection = $1 AND fields @> $2
            ORDER BY id
            "#,
        )
        .bind(&query.collection)
        .bind(Json(Self::filter_document(query)))
        .fetch_all(&self.pool)
        .await?;

        // Containment also matches array supersets, so re-check exact equality
        Ok(rows
            .into_iter()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, Json(fields))| Record::new(id, fields))
            .collect())
    }

    async fn create_record(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<RecordId, StoreError> {
        let id = Uuid::new_v4().simple().to_string();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, fields, created_at)
            VALUES ($1, $2, $3 || jsonb_build_object($4::text, to_jsonb(NOW())), NOW())
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(Value::Object(fields)))
        .bind(CREATED_AT_FIELD)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_record(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let row: Option<(Json<Fields>,)> = sqlx::query_as(
            r#"
            SELECT fields
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(fields),)| Record::new(id, fields)))
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        update: Update,
    ) -> Result<(), StoreError> {
        let mut transaction = self.pool.begin().await?;

        let row: Option<(Json<Fields>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT fields, NOW()
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await?;

        let (Json(mut fields), now) = row.ok_or_else(|| StoreError::missing(collection, id))?;
        apply_updates(&mut fields, &update, now);

        sqlx::query(
            r#"
            UPDATE documents
            SET fields = $3
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        Ok(())
    }
}
