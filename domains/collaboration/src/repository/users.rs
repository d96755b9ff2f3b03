//! User repository

use std::sync::Arc;

use sharekit_common::Result;

use super::store::{DocumentStore, Query};
use crate::domain::entities::{User, USERS_COLLECTION};

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Find every user registered under `email`, in store order
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<User>> {
        let records = self
            .store
            .lookup(&Query::new(USERS_COLLECTION).where_eq("email", email))
            .await?;

        records
            .iter()
            .map(|record| record.decode().map_err(Into::into))
            .collect()
    }

    /// Find user by ID
    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let record = self.store.get_record(USERS_COLLECTION, user_id).await?;
        Ok(record.map(|r| r.decode()).transpose()?)
    }
}
