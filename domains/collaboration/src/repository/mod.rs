//! Repository implementations for the collaboration domain

pub mod categories;
pub mod invitations;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod users;

use std::sync::Arc;

pub use categories::CategoryRepository;
pub use invitations::InvitationRepository;
pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use store::{
    apply_updates, DocumentStore, FieldUpdate, Fields, Query, Record, RecordId, StoreOperation,
    Update,
};
pub use users::UserRepository;

/// Combined repository access for the collaboration domain
#[derive(Clone)]
pub struct CollaborationRepositories {
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub invitations: InvitationRepository,
}

impl CollaborationRepositories {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            invitations: InvitationRepository::new(store),
        }
    }
}
