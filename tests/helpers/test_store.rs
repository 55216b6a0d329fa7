#![allow(dead_code)]
use kruxdesk::application::services::ConversationStore;
use kruxdesk::domain::entities::{Ticket, User};
use kruxdesk::domain::ports::key_value_store::KeyValueStore;
use kruxdesk::infrastructure::storage::InMemoryStore;
use std::sync::Arc;

pub const TICKETS_KEY: &str = "krux_tickets";
pub const SESSION_KEY: &str = "krux_user";

pub struct TestStore {
    pub kv: Arc<InMemoryStore>,
    pub store: Arc<ConversationStore>,
}

impl TestStore {
    /// Reopen a fresh store over the same backing key-value data
    pub async fn reopen(&self) -> ConversationStore {
        ConversationStore::open(self.kv.clone() as Arc<dyn KeyValueStore>, TICKETS_KEY).await
    }
}

pub async fn setup_test_store() -> TestStore {
    let kv = Arc::new(InMemoryStore::new());
    let store = ConversationStore::open(kv.clone() as Arc<dyn KeyValueStore>, TICKETS_KEY).await;
    TestStore {
        kv,
        store: Arc::new(store),
    }
}

pub fn rahul() -> User {
    User::customer("c1", "Rahul Sharma", "+919876543210")
}

pub fn priya() -> User {
    User::customer("c2", "Priya Patel", "+919876543211")
}

pub fn amit() -> User {
    User::agent("a1", "Amit Kumar", "amit.kumar")
}

pub fn sneha() -> User {
    User::agent("a2", "Sneha Singh", "sneha.singh")
}

pub fn test_ticket(id: &str, customer: &User) -> Ticket {
    Ticket::open_for(id, customer)
}

/// Create a ticket directly in the store
pub async fn create_test_ticket(store: &ConversationStore, id: &str, customer: &User) -> Ticket {
    store
        .create_ticket(test_ticket(id, customer))
        .await
        .expect("Failed to create ticket")
}
