//! Invitation repository

use std::sync::Arc;

use serde_json::Value;
use sharekit_common::{Error, Result, StoreError};

use super::store::{DocumentStore, Query, Update};
use crate::domain::entities::{Invitation, NewInvitation, INVITATIONS_COLLECTION};
use crate::domain::state::InvitationStatus;

#[derive(Clone)]
pub struct InvitationRepository {
    store: Arc<dyn DocumentStore>,
}

impl InvitationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Find invitation by ID
    pub async fn get_by_id(&self, invitation_id: &str) -> Result<Option<Invitation>> {
        let record = self
            .store
            .get_record(INVITATIONS_COLLECTION, invitation_id)
            .await?;
        Ok(record.map(|r| r.decode()).transpose()?)
    }

    /// Create a new invitation and read it back with its store-assigned fields
    pub async fn create(&self, invitation: &NewInvitation) -> Result<Invitation> {
        let fields = match serde_json::to_value(invitation)? {
            Value::Object(fields) => fields,
            other => {
                return Err(Error::Store(StoreError::InvalidData(format!(
                    "invitation encoded as {} instead of an object",
                    other
                ))))
            }
        };

        let id = self
            .store
            .create_record(INVITATIONS_COLLECTION, fields)
            .await?;

        self.get_by_id(&id).await?.ok_or_else(|| {
            Error::Store(StoreError::Backend(format!(
                "invitation {} vanished right after creation",
                id
            )))
        })
    }

    /// Overwrite the status and stamp `updatedAt`
    pub async fn set_status(&self, invitation_id: &str, status: InvitationStatus) -> Result<()> {
        self.store
            .update_record(
                INVITATIONS_COLLECTION,
                invitation_id,
                Update::new()
                    .set("status", status.as_str())
                    .server_timestamp("updatedAt"),
            )
            .await?;
        Ok(())
    }

    /// Pending invitations of `email` to `category_id`
    pub async fn find_pending_for_category_email(
        &self,
        category_id: &str,
        email: &str,
    ) -> Result<Vec<Invitation>> {
        let query = Query::new(INVITATIONS_COLLECTION)
            .where_eq("categoryId", category_id)
            .where_eq("invitedEmail", email)
            .where_eq("status", InvitationStatus::Pending.as_str());

        let records = self.store.lookup(&query).await?;
        records
            .iter()
            .map(|record| record.decode().map_err(Into::into))
            .collect()
    }

    /// All pending invitations addressed to `user_id`, in store order
    pub async fn find_pending_for_user(&self, user_id: &str) -> Result<Vec<Invitation>> {
        let query = Query::new(INVITATIONS_COLLECTION)
            .where_eq("invitedUserId", user_id)
            .where_eq("status", InvitationStatus::Pending.as_str());

        let records = self.store.lookup(&query).await?;
        records
            .iter()
            .map(|record| record.decode().map_err(Into::into))
            .collect()
    }
}
