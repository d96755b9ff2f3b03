//! Collaboration workflow
//!
//! [`CollaborationManager`] issues invitations to a category, resolves them into
//! membership changes, and manages direct shares. Every operation is a sequence of
//! independent store calls: nothing here is transactional, and an operation that
//! fails part-way may already have applied its earlier steps. Each operation logs
//! its failure once and returns the error unchanged.

use std::sync::Arc;

use sharekit_common::{Config, Error, ResolutionPolicy, Result};

use crate::domain::entities::{Category, Invitation, NewInvitation, User};
use crate::domain::state::{InvitationEvent, InvitationStateMachine};
use crate::domain::validation::validate_invite_email;
use crate::repository::{
    CollaborationRepositories, DocumentStore, InMemoryDocumentStore, PgDocumentStore,
};

/// Behavior knobs for [`CollaborationManager`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollaborationConfig {
    /// How an already accepted or declined invitation is treated when resolved again
    pub resolution_policy: ResolutionPolicy,
}

impl From<&Config> for CollaborationConfig {
    fn from(config: &Config) -> Self {
        Self {
            resolution_policy: config.resolution_policy,
        }
    }
}

/// Invitation and sharing workflow over a [`DocumentStore`]
#[derive(Clone)]
pub struct CollaborationManager {
    repos: CollaborationRepositories,
    config: CollaborationConfig,
}

impl CollaborationManager {
    /// Create a manager with the default (strict) configuration
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, CollaborationConfig::default())
    }

    /// Create a manager with an explicit configuration
    pub fn with_config(store: Arc<dyn DocumentStore>, config: CollaborationConfig) -> Self {
        Self {
            repos: CollaborationRepositories::new(store),
            config,
        }
    }

    /// Build a manager on PostgreSQL when `DATABASE_URL` is configured,
    /// otherwise on a fresh in-memory store
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => Arc::new(PgDocumentStore::connect(url).await.inspect_err(|e| {
                tracing::error!(error = %e, "Failed to connect document store");
            })?),
            None => {
                tracing::warn!("DATABASE_URL not set, collaboration data is kept in memory");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Ok(Self::with_config(store, config.into()))
    }

    /// Active configuration
    pub fn config(&self) -> &CollaborationConfig {
        &self.config
    }

    /// Invite the user registered under `email` to collaborate on a category.
    ///
    /// Creates a pending invitation, then adds `email` to the category's pending
    /// invites. The two writes are separate: if the second fails, the invitation
    /// already exists and the error is returned as-is.
    pub async fn invite_collaborator(&self, category_id: &str, email: &str) -> Result<Invitation> {
        self.try_invite_collaborator(category_id, email)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    category_id = %category_id,
                    email = %email,
                    "Failed to invite collaborator"
                );
            })
    }

    async fn try_invite_collaborator(&self, category_id: &str, email: &str) -> Result<Invitation> {
        if !validate_invite_email(email) {
            return Err(Error::Validation("Email must not be empty".to_string()));
        }

        // Several profiles may share an email; the smallest id wins
        let invited_user = self
            .repos
            .users
            .find_by_email(email)
            .await?
            .into_iter()
            .min_by(|a, b| a.id.cmp(&b.id))
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let invitation = self
            .repos
            .invitations
            .create(&NewInvitation::pending(category_id, &invited_user, email))
            .await?;

        self.repos
            .categories
            .add_pending_invite(category_id, email)
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            category_id = %category_id,
            invited_user_id = %invitation.invited_user_id,
            "Collaborator invited"
        );

        Ok(invitation)
    }

    /// Share a category directly with `user_ids`, bypassing invitations
    pub async fn share_category(&self, category_id: &str, user_ids: &[String]) -> Result<()> {
        self.repos
            .categories
            .share_with(category_id, user_ids)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, category_id = %category_id, "Failed to share category");
            })?;

        tracing::info!(
            category_id = %category_id,
            user_count = user_ids.len(),
            "Category shared"
        );
        Ok(())
    }

    /// Accept an invitation: mark it accepted, then add the invitee as a
    /// collaborator and clear their pending invite.
    ///
    /// The pending invite stays listed while another pending invitation for the
    /// same email and category exists.
    pub async fn accept_invitation(&self, invitation_id: &str) -> Result<()> {
        self.resolve_invitation(invitation_id, InvitationEvent::Accept)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    invitation_id = %invitation_id,
                    "Failed to accept invitation"
                );
            })
    }

    /// Decline an invitation: mark it declined, then clear the pending invite
    pub async fn decline_invitation(&self, invitation_id: &str) -> Result<()> {
        self.resolve_invitation(invitation_id, InvitationEvent::Decline)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    invitation_id = %invitation_id,
                    "Failed to decline invitation"
                );
            })
    }

    async fn resolve_invitation(&self, invitation_id: &str, event: InvitationEvent) -> Result<()> {
        let invitation = self
            .repos
            .invitations
            .get_by_id(invitation_id)
            .await?
            .ok_or_else(|| Error::NotFound("Invitation not found".to_string()))?;

        if invitation.status.is_terminal() {
            tracing::warn!(
                invitation_id = %invitation_id,
                status = %invitation.status,
                policy = %self.config.resolution_policy,
                "Resolving an invitation that is already resolved"
            );
        }

        let next = InvitationStateMachine::resolve(
            invitation.status,
            event,
            self.config.resolution_policy,
        )?;

        self.repos
            .invitations
            .set_status(invitation_id, next)
            .await?;

        // Another pending invitation for the same email keeps it listed
        let still_invited = !self
            .repos
            .invitations
            .find_pending_for_category_email(&invitation.category_id, &invitation.invited_email)
            .await?
            .is_empty();
        let clear_email = (!still_invited).then_some(invitation.invited_email.as_str());

        match (event, clear_email) {
            (InvitationEvent::Accept, clear_email) => {
                self.repos
                    .categories
                    .admit_collaborator(
                        &invitation.category_id,
                        &invitation.invited_user_id,
                        clear_email,
                    )
                    .await?
            }
            (InvitationEvent::Decline, Some(email)) => {
                self.repos
                    .categories
                    .clear_pending_invite(&invitation.category_id, email)
                    .await?
            }
            (InvitationEvent::Decline, None) => {}
        }

        tracing::info!(
            invitation_id = %invitation_id,
            category_id = %invitation.category_id,
            status = %next,
            "Invitation resolved"
        );
        Ok(())
    }

    /// Remove a collaborator from a category; removing a non-member is a no-op
    pub async fn remove_collaborator(&self, category_id: &str, user_id: &str) -> Result<()> {
        self.repos
            .categories
            .remove_collaborator(category_id, user_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    category_id = %category_id,
                    user_id = %user_id,
                    "Failed to remove collaborator"
                );
            })
    }

    /// Pending invitations addressed to `user_id`
    pub async fn get_user_collaborations(&self, user_id: &str) -> Result<Vec<Invitation>> {
        self.repos
            .invitations
            .find_pending_for_user(user_id)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, user_id = %user_id, "Failed to get user collaborations");
            })
    }

    /// Collaborators of a category, in category order.
    ///
    /// Collaborator ids without a user profile are skipped rather than reported.
    pub async fn get_category_collaborators(&self, category_id: &str) -> Result<Vec<User>> {
        self.try_get_category_collaborators(category_id)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    category_id = %category_id,
                    "Failed to get category collaborators"
                );
            })
    }

    async fn try_get_category_collaborators(&self, category_id: &str) -> Result<Vec<User>> {
        let category = self.require_category(category_id).await?;

        let mut collaborators = Vec::with_capacity(category.collaborators.len());
        for user_id in &category.collaborators {
            match self.repos.users.get_by_id(user_id).await? {
                Some(user) => collaborators.push(user),
                None => {
                    tracing::debug!(
                        category_id = %category_id,
                        user_id = %user_id,
                        "Skipping collaborator without a user profile"
                    );
                }
            }
        }

        Ok(collaborators)
    }

    /// Fetch a category
    pub async fn get_category(&self, category_id: &str) -> Result<Category> {
        self.require_category(category_id).await.inspect_err(|e| {
            tracing::error!(error = %e, category_id = %category_id, "Failed to get category");
        })
    }

    /// Fetch an invitation, whatever its status
    pub async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation> {
        self.repos
            .invitations
            .get_by_id(invitation_id)
            .await
            .and_then(|invitation| {
                invitation.ok_or_else(|| Error::NotFound("Invitation not found".to_string()))
            })
            .inspect_err(|e| {
                tracing::error!(error = %e, invitation_id = %invitation_id, "Failed to get invitation");
            })
    }

    async fn require_category(&self, category_id: &str) -> Result<Category> {
        self.repos
            .categories
            .get_by_id(category_id)
            .await?
            .ok_or_else(|| Error::NotFound("Category not found".to_string()))
    }
}
