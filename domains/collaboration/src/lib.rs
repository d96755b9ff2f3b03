//! Collaboration domain: shared categories, invitations, collaborators

pub mod domain;
pub mod manager;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{InvitationEvent, InvitationStateMachine, InvitationStatus};
pub use domain::validation::validate_invite_email;
// Re-export repository types
pub use repository::{
    apply_updates, CategoryRepository, CollaborationRepositories, DocumentStore, FieldUpdate,
    Fields, InMemoryDocumentStore, InvitationRepository, PgDocumentStore, Query, Record,
    RecordId, StoreOperation, Update, UserRepository,
};
// Re-export the service entry point
pub use manager::{CollaborationConfig, CollaborationManager};

pub use sharekit_common::{Error, ResolutionPolicy, Result, StoreError};
