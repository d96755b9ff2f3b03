//! Category repository
//!
//! Membership changes are expressed as set-union / set-remove field updates so
//! the store applies them against its current copy of the category.

use std::sync::Arc;

use sharekit_common::Result;

use super::store::{DocumentStore, Update};
use crate::domain::entities::{Category, CATEGORIES_COLLECTION};

#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<dyn DocumentStore>,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Find category by ID
    pub async fn get_by_id(&self, category_id: &str) -> Result<Option<Category>> {
        let record = self
            .store
            .get_record(CATEGORIES_COLLECTION, category_id)
            .await?;
        Ok(record.map(|r| r.decode()).transpose()?)
    }

    /// Record an outstanding invitation for `email`
    pub async fn add_pending_invite(&self, category_id: &str, email: &str) -> Result<()> {
        self.update(
            category_id,
            Update::new().array_union("pendingInvites", [email]),
        )
        .await
    }

    /// Mark the category shared and add `user_ids` as collaborators
    pub async fn share_with(&self, category_id: &str, user_ids: &[String]) -> Result<()> {
        self.update(
            category_id,
            Update::new()
                .set("shared", true)
                .array_union("collaborators", user_ids.iter().map(String::as_str))
                .server_timestamp("updatedAt"),
        )
        .await
    }

    /// Turn an accepted invitation into membership, optionally clearing the
    /// invitee's pending invite in the same write
    pub async fn admit_collaborator(
        &self,
        category_id: &str,
        user_id: &str,
        clear_email: Option<&str>,
    ) -> Result<()> {
        let mut update = Update::new().array_union("collaborators", [user_id]);
        if let Some(email) = clear_email {
            update = update.array_remove("pendingInvites", [email]);
        }
        self.update(category_id, update).await
    }

    /// Drop `email` from the outstanding invitations
    pub async fn clear_pending_invite(&self, category_id: &str, email: &str) -> Result<()> {
        self.update(
            category_id,
            Update::new().array_remove("pendingInvites", [email]),
        )
        .await
    }

    /// Remove a collaborator; a no-op on the set if absent
    pub async fn remove_collaborator(&self, category_id: &str, user_id: &str) -> Result<()> {
        self.update(
            category_id,
            Update::new()
                .array_remove("collaborators", [user_id])
                .server_timestamp("updatedAt"),
        )
        .await
    }

    async fn update(&self, category_id: &str, update: Update) -> Result<()> {
        self.store
            .update_record(CATEGORIES_COLLECTION, category_id, update)
            .await?;
        Ok(())
    }
}
