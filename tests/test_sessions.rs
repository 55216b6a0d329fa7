mod helpers;

use helpers::*;
use kruxdesk::domain::entities::UserRole;
use kruxdesk::domain::ports::key_value_store::KeyValueStore;
use kruxdesk::infrastructure::storage::InMemoryStore;
use kruxdesk::{DomainError, IdentityDirectory, SessionService};
use std::sync::Arc;

fn setup_sessions() -> (Arc<InMemoryStore>, SessionService) {
    let kv = Arc::new(InMemoryStore::new());
    let sessions = SessionService::new(
        kv.clone() as Arc<dyn KeyValueStore>,
        SESSION_KEY,
        IdentityDirectory::with_demo_accounts(),
    );
    (kv, sessions)
}

#[tokio::test]
async fn test_customer_login_persists_session() {
    let (kv, sessions) = setup_sessions();
    assert!(sessions.current_user().await.is_none());

    let user = sessions.login_customer(" +919876543210 ").await.unwrap();
    assert_eq!(user, rahul());
    assert_eq!(user.role, UserRole::Customer);

    assert_eq!(sessions.current_user().await, Some(rahul()));
    let blob = kv.get(SESSION_KEY).await.unwrap().unwrap();
    assert!(blob.contains("\"role\":\"customer\""));
}

#[tokio::test]
async fn test_agent_login() {
    let (_kv, sessions) = setup_sessions();

    let user = sessions.login_agent("sneha.singh").await.unwrap();
    assert_eq!(user, sneha());
    assert!(user.is_agent());
    assert_eq!(sessions.current_user().await.map(|u| u.id), Some("a2".to_string()));
}

#[tokio::test]
async fn test_unknown_credentials_are_rejected_with_hint() {
    let (kv, sessions) = setup_sessions();

    match sessions.login_customer("+910000000000").await {
        Err(DomainError::Unauthorized(msg)) => {
            assert!(msg.starts_with("Invalid phone number. Try: "));
            assert!(msg.contains("+919876543210"));
            assert!(msg.contains("+919876543211"));
        }
        other => panic!("Unexpected result: {:?}", other),
    }

    match sessions.login_agent("rahul").await {
        Err(DomainError::Unauthorized(msg)) => {
            assert_eq!(msg, "Invalid username. Try: amit.kumar or sneha.singh");
        }
        other => panic!("Unexpected result: {:?}", other),
    }

    assert!(kv.get(SESSION_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_roles_do_not_cross_over() {
    let (_kv, sessions) = setup_sessions();

    // An agent's username is not a customer phone and vice versa
    assert!(sessions.login_customer("amit.kumar").await.is_err());
    assert!(sessions.login_agent("+919876543211").await.is_err());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (kv, sessions) = setup_sessions();
    sessions.login_customer("+919876543211").await.unwrap();

    sessions.logout().await.unwrap();
    assert!(sessions.current_user().await.is_none());
    assert!(kv.get(SESSION_KEY).await.unwrap().is_none());

    // Logging out twice is harmless
    sessions.logout().await.unwrap();
}

#[tokio::test]
async fn test_new_login_replaces_previous_session() {
    let (_kv, sessions) = setup_sessions();
    sessions.login_customer("+919876543210").await.unwrap();
    sessions.login_agent("amit.kumar").await.unwrap();

    assert_eq!(sessions.current_user().await, Some(amit()));
}

#[tokio::test]
async fn test_corrupt_session_counts_as_logged_out() {
    let (kv, sessions) = setup_sessions();
    kv.set(SESSION_KEY, "{not json").await.unwrap();

    assert!(sessions.current_user().await.is_none());

    sessions.login_agent("amit.kumar").await.unwrap();
    assert_eq!(sessions.current_user().await, Some(amit()));
}

#[tokio::test]
async fn test_directory_lookups() {
    let directory = IdentityDirectory::with_demo_accounts();
    assert_eq!(directory.users().len(), 4);
    assert_eq!(
        directory.find_customer_by_phone("+919876543211").map(|u| u.name.as_str()),
        Some("Priya Patel")
    );
    assert!(directory.find_agent_by_username("sneha.singh").is_some());
    assert!(directory.find_agent_by_username("SNEHA.SINGH").is_none());
}
