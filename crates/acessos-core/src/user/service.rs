//! User registration, lookup and password authentication

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{NewUser, Principal, Role, User, UserView};
use crate::clock::Clock;
use crate::crypto::{hash_password, verify_password};
use crate::error::{Result, VaultError};
use crate::storage::Store;

/// User service
pub struct UserService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create an account with the given role, without an authorization check
    pub async fn create(&self, new: NewUser, role: Role) -> Result<User> {
        new.validate()?;

        let password = new.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| VaultError::KeyDerivationError(e.to_string()))??;

        let user = User {
            id: 0,
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            password_hash,
            role,
            active: true,
            created_at: self.clock.now(),
        };

        let user = self.store.insert_user(user).await?;
        info!("Registered user {} ({}) as {}", user.id, user.email, user.role);
        Ok(user)
    }

    /// Register a standard user. Administrators only.
    pub async fn register(&self, requester: &Principal, new: NewUser) -> Result<UserView> {
        require_admin(requester)?;
        debug!("User {} registering {}", requester.email, new.email);
        Ok(self.create(new, Role::User).await?.view())
    }

    /// Create the bootstrap administrator unless the email is already taken
    pub async fn ensure_admin(&self, new: NewUser) -> Result<bool> {
        if self.store.find_user_by_email(&new.email).await?.is_some() {
            debug!("Bootstrap admin {} already exists", new.email);
            return Ok(false);
        }
        self.create(new, Role::Admin).await?;
        Ok(true)
    }

    /// Check an email/password pair
    ///
    /// Unknown email, inactive account and wrong password all produce the same
    /// `AuthenticationFailed`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        info!("Authentication attempt for {}", email);

        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Err(VaultError::AuthenticationFailed);
        };
        if !user.active {
            return Err(VaultError::AuthenticationFailed);
        }

        let password = password.to_string();
        let phc = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
            .await
            .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;

        match verified {
            Ok(true) => {
                info!("Authentication succeeded for {}", user.email);
                Ok(user)
            }
            Ok(false) => Err(VaultError::AuthenticationFailed),
            Err(e) => {
                warn!("Stored password hash for user {} is unusable: {}", user.id, e);
                Err(VaultError::AuthenticationFailed)
            }
        }
    }

    /// Active account behind a token subject
    pub async fn active_user(&self, id: u64) -> Result<User> {
        match self.store.get_user(id).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(VaultError::InvalidSession),
        }
    }

    pub async fn get(&self, requester: &Principal, id: u64) -> Result<UserView> {
        require_admin(requester)?;
        self.store
            .get_user(id)
            .await?
            .map(|u| u.view())
            .ok_or_else(|| VaultError::not_found(format!("User not found with id: {}", id)))
    }

    /// Active users. Administrators only.
    pub async fn list(&self, requester: &Principal) -> Result<Vec<UserView>> {
        require_admin(requester)?;
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.active)
            .map(|u| u.view())
            .collect())
    }
}

fn require_admin(requester: &Principal) -> Result<()> {
    if requester.is_admin() {
        Ok(())
    } else {
        Err(VaultError::forbidden(
            "You do not have permission to access this resource.",
        ))
    }
}
