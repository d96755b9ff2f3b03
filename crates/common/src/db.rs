//! Shared document store types for Sharekit
//!
//! This module provides the error type every document store implementation reports.

use thiserror::Error;

/// Document store error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record {collection}/{id} not found")]
    MissingRecord { collection: String, id: String },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn missing(collection: &str, id: &str) -> Self {
        StoreError::MissingRecord {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidData(err.to_string())
    }
}
