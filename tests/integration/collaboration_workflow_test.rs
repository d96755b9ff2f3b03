//! Collaboration Workflow Integration Tests
//!
//! Drives the public `CollaborationManager` API end to end against the
//! in-memory document store: invite, list, accept/decline, share, remove,
//! and the membership invariants that must hold between those steps.

use std::sync::Arc;

use serde_json::json;
use sharekit_collaboration::{
    Category, CollaborationConfig, CollaborationManager, DocumentStore, Error, Fields,
    InMemoryDocumentStore, InvitationStatus, Query, ResolutionPolicy, CATEGORIES_COLLECTION,
    INVITATIONS_COLLECTION, USERS_COLLECTION,
};

fn fields(value: serde_json::Value) -> Fields {
    value.as_object().cloned().unwrap_or_default()
}

fn seeded_store() -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new();
    for (id, email, name) in [
        ("u-owner", "owner@example.com", "Olive"),
        ("u-ana", "ana@example.com", "Ana"),
        ("u-bo", "bo@example.com", "Bo"),
        ("u-cy", "cy@example.com", "Cy"),
    ] {
        store.insert_record(
            USERS_COLLECTION,
            id,
            fields(json!({ "email": email, "name": name })),
        );
    }
    store.insert_record(
        CATEGORIES_COLLECTION,
        "cat-trips",
        fields(json!({ "name": "Trips", "ownerId": "u-owner" })),
    );
    store
}

/// Every pending invite on the category is backed by a pending invitation and
/// vice versa
async fn assert_pending_invites_consistent(store: &InMemoryDocumentStore, category: &Category) {
    let pending = store
        .lookup(
            &Query::new(INVITATIONS_COLLECTION)
                .where_eq("categoryId", category.id.as_str())
                .where_eq("status", "pending"),
        )
        .await
        .unwrap();

    let mut expected: Vec<String> = pending
        .iter()
        .filter_map(|r| r.fields.get("invitedEmail").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect();
    expected.sort();
    expected.dedup();

    let mut actual = category.pending_invites.clone();
    actual.sort();

    assert_eq!(actual, expected, "pendingInvites out of sync with invitations");
}

#[test_log::test(tokio::test)]
async fn test_invitation_lifecycle_end_to_end() -> anyhow::Result<()> {
    let store = seeded_store();
    let manager = CollaborationManager::new(Arc::new(store.clone()));

    // ========================================================================
    // Step 1: Owner invites three people
    // ========================================================================
    let ana = manager
        .invite_collaborator("cat-trips", "ana@example.com")
        .await?;
    let bo = manager
        .invite_collaborator("cat-trips", "bo@example.com")
        .await?;
    let cy = manager
        .invite_collaborator("cat-trips", "cy@example.com")
        .await?;

    let category = manager.get_category("cat-trips").await?;
    assert_eq!(category.pending_invites.len(), 3);
    assert!(category.collaborators.is_empty());
    assert_pending_invites_consistent(&store, &category).await;

    // ========================================================================
    // Step 2: Invitees see their pending invitations
    // ========================================================================
    let for_ana = manager.get_user_collaborations("u-ana").await?;
    assert_eq!(for_ana.len(), 1);
    assert_eq!(for_ana[0].id, ana.id);
    assert_eq!(for_ana[0].status, InvitationStatus::Pending);

    // ========================================================================
    // Step 3: Ana and Cy accept, Bo declines
    // ========================================================================
    manager.accept_invitation(&ana.id).await?;
    manager.decline_invitation(&bo.id).await?;
    manager.accept_invitation(&cy.id).await?;

    let category = manager.get_category("cat-trips").await?;
    assert_eq!(
        category.collaborators,
        vec!["u-ana".to_string(), "u-cy".to_string()]
    );
    assert!(category.pending_invites.is_empty());
    assert_pending_invites_consistent(&store, &category).await;
    assert_eq!(category.extra.get("ownerId"), Some(&json!("u-owner")));

    assert!(manager.get_user_collaborations("u-ana").await?.is_empty());
    assert!(manager.get_user_collaborations("u-bo").await?.is_empty());

    // Resolved invitations stay around as history
    assert_eq!(store.record_count(INVITATIONS_COLLECTION), 3);
    assert_eq!(
        manager.get_invitation(&bo.id).await?.status,
        InvitationStatus::Declined
    );

    // ========================================================================
    // Step 4: Collaborators resolve to user profiles
    // ========================================================================
    let users = manager.get_category_collaborators("cat-trips").await?;
    let names: Vec<_> = users.iter().filter_map(|u| u.name.as_deref()).collect();
    assert_eq!(names, vec!["Ana", "Cy"]);

    // ========================================================================
    // Step 5: Removing a collaborator leaves invitation history untouched
    // ========================================================================
    manager.remove_collaborator("cat-trips", "u-ana").await?;

    let category = manager.get_category("cat-trips").await?;
    assert_eq!(category.collaborators, vec!["u-cy".to_string()]);
    assert_eq!(
        manager.get_invitation(&ana.id).await?.status,
        InvitationStatus::Accepted
    );

    Ok(())
}

#[tokio::test]
async fn test_direct_share_and_invitation_mix() -> anyhow::Result<()> {
    let store = seeded_store();
    let manager = CollaborationManager::new(Arc::new(store.clone()));

    manager
        .share_category("cat-trips", &["u-bo".to_string(), "u-ana".to_string()])
        .await?;
    let invitation = manager
        .invite_collaborator("cat-trips", "ana@example.com")
        .await?;
    manager.accept_invitation(&invitation.id).await?;

    let category = manager.get_category("cat-trips").await?;
    assert!(category.shared);
    assert_eq!(
        category.collaborators,
        vec!["u-bo".to_string(), "u-ana".to_string()]
    );
    assert!(category.pending_invites.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_repeat_invitations_for_same_email() -> anyhow::Result<()> {
    let store = seeded_store();
    let manager = CollaborationManager::new(Arc::new(store.clone()));

    let first = manager
        .invite_collaborator("cat-trips", "ana@example.com")
        .await?;
    let second = manager
        .invite_collaborator("cat-trips", "ana@example.com")
        .await?;
    assert_ne!(first.id, second.id);

    // The email is listed once even with two pending invitations
    let category = manager.get_category("cat-trips").await?;
    assert_eq!(category.pending_invites, vec!["ana@example.com".to_string()]);
    assert_eq!(manager.get_user_collaborations("u-ana").await?.len(), 2);

    // Still listed while the second invitation is pending
    manager.decline_invitation(&first.id).await?;
    let category = manager.get_category("cat-trips").await?;
    assert_eq!(category.pending_invites, vec!["ana@example.com".to_string()]);
    assert_pending_invites_consistent(&store, &category).await;
    assert_eq!(manager.get_user_collaborations("u-ana").await?.len(), 1);

    manager.accept_invitation(&second.id).await?;
    let category = manager.get_category("cat-trips").await?;
    assert!(category.pending_invites.is_empty());
    assert_eq!(category.collaborators, vec!["u-ana".to_string()]);
    assert_pending_invites_consistent(&store, &category).await;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_accepts_are_idempotent_on_membership() {
    let store = seeded_store();
    let manager = Arc::new(CollaborationManager::with_config(
        Arc::new(store.clone()),
        CollaborationConfig {
            resolution_policy: ResolutionPolicy::Permissive,
        },
    ));
    let invitation = manager
        .invite_collaborator("cat-trips", "bo@example.com")
        .await
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            let id = invitation.id.clone();
            tokio::spawn(async move { manager.accept_invitation(&id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let category = manager.get_category("cat-trips").await.unwrap();
    assert_eq!(category.collaborators, vec!["u-bo".to_string()]);
}

#[tokio::test]
async fn test_strict_policy_rejects_second_resolution() {
    let store = seeded_store();
    let manager = CollaborationManager::new(Arc::new(store.clone()));
    let invitation = manager
        .invite_collaborator("cat-trips", "cy@example.com")
        .await
        .unwrap();

    manager.accept_invitation(&invitation.id).await.unwrap();
    let again = manager.decline_invitation(&invitation.id).await;

    assert!(matches!(again, Err(Error::Conflict(_))));
    let category = manager.get_category("cat-trips").await.unwrap();
    assert_eq!(category.collaborators, vec!["u-cy".to_string()]);
}

#[tokio::test]
async fn test_missing_targets_report_not_found() {
    let manager = CollaborationManager::new(Arc::new(seeded_store()));

    assert!(matches!(
        manager
            .invite_collaborator("cat-trips", "stranger@example.com")
            .await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.get_category_collaborators("cat-missing").await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        manager.accept_invitation("inv-missing").await,
        Err(Error::NotFound(_))
    ));
}
