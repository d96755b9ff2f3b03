//! Domain entities for the collaboration domain
//!
//! Entities are decoded from store records. Field names on the wire are
//! camelCase, and a category's id is stored on invitations as `categoryId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::state::InvitationStatus;
use crate::repository::Fields;

/// Collection holding user profiles
pub const USERS_COLLECTION: &str = "users";

/// Collection holding invitations
pub const INVITATIONS_COLLECTION: &str = "collaborations";

/// Collection holding shared categories
pub const CATEGORIES_COLLECTION: &str = "categories";

/// User profile, read-only from this domain's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Empty when the profile has no email on record
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A category that can be shared with collaborators
///
/// `collaborators` and `pending_invites` have set semantics (no duplicates) but
/// keep the order the store holds them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub pending_invites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields owned by other parts of the application (name, owner, ...)
    #[serde(flatten)]
    pub extra: Fields,
}

impl Category {
    pub fn has_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.iter().any(|id| id == user_id)
    }

    pub fn has_pending_invite(&self, email: &str) -> bool {
        self.pending_invites.iter().any(|e| e == email)
    }
}

/// Invitation for a user to collaborate on a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub invited_user_id: String,
    pub invited_email: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}

/// Fields written when an invitation is created; the store assigns id and `createdAt`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvitation {
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub invited_user_id: String,
    pub invited_email: String,
    pub status: InvitationStatus,
}

impl NewInvitation {
    /// A pending invitation for `user` to join `category_id`
    pub fn pending(category_id: &str, user: &User, email: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            invited_user_id: user.id.clone(),
            invited_email: email.to_string(),
            status: InvitationStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_decodes_with_defaults_and_extra_fields() {
        let category: Category = serde_json::from_value(json!({
            "id": "cat-1",
            "name": "Groceries",
            "ownerId": "u-owner"
        }))
        .unwrap();

        assert_eq!(category.id, "cat-1");
        assert!(!category.shared);
        assert!(category.collaborators.is_empty());
        assert!(category.pending_invites.is_empty());
        assert!(category.updated_at.is_none());
        assert_eq!(category.extra.get("name"), Some(&json!("Groceries")));
        assert!(!category.extra.contains_key("id"));
    }

    #[test]
    fn test_category_membership_helpers() {
        let category: Category = serde_json::from_value(json!({
            "id": "cat-1",
            "shared": true,
            "collaborators": ["u1", "u2"],
            "pendingInvites": ["c@example.com"]
        }))
        .unwrap();

        assert!(category.has_collaborator("u2"));
        assert!(!category.has_collaborator("u3"));
        assert!(category.has_pending_invite("c@example.com"));
        assert!(!category.has_pending_invite("u1"));
    }

    #[test]
    fn test_invitation_uses_stored_field_names() {
        let invitation: Invitation = serde_json::from_value(json!({
            "id": "inv-1",
            "categoryId": "cat-1",
            "invitedUserId": "u1",
            "invitedEmail": "a@example.com",
            "status": "pending",
            "createdAt": "2026-01-02T03:04:05Z"
        }))
        .unwrap();

        assert_eq!(invitation.category_id, "cat-1");
        assert!(invitation.is_pending());
        assert!(invitation.updated_at.is_none());
    }

    #[test]
    fn test_new_invitation_fields() {
        let user = User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: None,
            avatar_url: None,
        };
        let fields = serde_json::to_value(NewInvitation::pending("cat-1", &user, "a@example.com"))
            .unwrap();

        assert_eq!(
            fields,
            json!({
                "categoryId": "cat-1",
                "invitedUserId": "u1",
                "invitedEmail": "a@example.com",
                "status": "pending"
            })
        );
    }
}
