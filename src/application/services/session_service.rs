use crate::domain::entities::{User, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::key_value_store::KeyValueStore;
use std::sync::Arc;

/// Known customers and agents that may open a session
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    users: Vec<User>,
}

impl IdentityDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// The demo accounts shipped with the assistant
    pub fn with_demo_accounts() -> Self {
        Self::new(vec![
            User::customer("c1", "Rahul Sharma", "+919876543210"),
            User::customer("c2", "Priya Patel", "+919876543211"),
            User::agent("a1", "Amit Kumar", "amit.kumar"),
            User::agent("a2", "Sneha Singh", "sneha.singh"),
        ])
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_customer_by_phone(&self, phone: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.role == UserRole::Customer && u.phone.as_deref() == Some(phone))
    }

    pub fn find_agent_by_username(&self, username: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.role == UserRole::Agent && u.username.as_deref() == Some(username))
    }

    fn hint(&self, role: UserRole) -> String {
        self.users
            .iter()
            .filter(|u| u.role == role)
            .filter_map(|u| match role {
                UserRole::Customer => u.phone.clone(),
                UserRole::Agent => u.username.clone(),
            })
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Login state persisted under a single key.
///
/// Absence of the key means logged out.
#[derive(Clone)]
pub struct SessionService {
    kv: Arc<dyn KeyValueStore>,
    session_key: String,
    directory: IdentityDirectory,
}

impl SessionService {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        session_key: impl Into<String>,
        directory: IdentityDirectory,
    ) -> Self {
        Self {
            kv,
            session_key: session_key.into(),
            directory,
        }
    }

    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    #[tracing::instrument(skip(self))]
    pub async fn login_customer(&self, phone: &str) -> DomainResult<User> {
        let user = self
            .directory
            .find_customer_by_phone(phone.trim())
            .cloned()
            .ok_or_else(|| {
                DomainError::Unauthorized(format!(
                    "Invalid phone number. Try: {}",
                    self.directory.hint(UserRole::Customer)
                ))
            })?;

        self.save(&user).await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn login_agent(&self, username: &str) -> DomainResult<User> {
        let user = self
            .directory
            .find_agent_by_username(username.trim())
            .cloned()
            .ok_or_else(|| {
                DomainError::Unauthorized(format!(
                    "Invalid username. Try: {}",
                    self.directory.hint(UserRole::Agent)
                ))
            })?;

        self.save(&user).await?;
        Ok(user)
    }

    /// The logged-in user, if any. An unreadable session counts as logged out.
    pub async fn current_user(&self) -> Option<User> {
        match self.kv.get(&self.session_key).await {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt session under {}: {}", self.session_key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not read session under {}: {}", self.session_key, e);
                None
            }
        }
    }

    pub async fn logout(&self) -> DomainResult<()> {
        self.kv.remove(&self.session_key).await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    async fn save(&self, user: &User) -> DomainResult<()> {
        let blob = serde_json::to_string(user)?;
        self.kv.set(&self.session_key, &blob).await?;
        tracing::info!("{} {} logged in", user.role, user.id);
        Ok(())
    }
}
