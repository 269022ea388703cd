//! Main vault orchestration

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::acesso::{AcessoService, AcessoView, ExpirationClassifier, VisibilityPolicy};
use crate::clock::{Clock, SystemClock};
use crate::crypto::{derive_key, generate_salt, SecretCipher};
use crate::error::{Result, VaultError};
use crate::notification::{Notification, NotificationFeed};
use crate::session::{Session, TokenService};
use crate::settings::Settings;
use crate::storage::{JsonFileStore, KeyStore, Store};
use crate::user::{Principal, UserService};

/// Known plaintext sealed at first start to detect a changed token secret
const VERIFICATION_PLAINTEXT: &str = "acessos-vault-verification";

/// Main vault struct that wires the services together
pub struct Vault {
    store: Arc<dyn Store>,
    /// User accounts
    pub users: UserService,
    /// Credentials
    pub acessos: AcessoService,
    feed: NotificationFeed,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    settings: Settings,
}

impl Vault {
    /// Open the vault stored in `dir`
    pub async fn open(settings: Settings, dir: &Path) -> Result<Self> {
        let store = Arc::new(JsonFileStore::open(dir).await?);
        Self::with_store(store.clone(), store.as_ref(), settings, Arc::new(SystemClock)).await
    }

    /// Memory-only vault
    pub async fn in_memory(settings: Settings, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = Arc::new(JsonFileStore::in_memory());
        Self::with_store(store.clone(), store.as_ref(), settings, clock).await
    }

    /// Build a vault over any store. `keys` holds the sealing-key salt and
    /// verification blob.
    pub async fn with_store(
        store: Arc<dyn Store>,
        keys: &dyn KeyStore,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let secret = settings.token_secret_bytes()?;
        let cipher = unlock_cipher(keys, &secret).await?;

        let users = UserService::new(store.clone(), clock.clone());
        let acessos = AcessoService::new(
            store.clone(),
            cipher,
            VisibilityPolicy::new(settings.admin_reads_private),
            ExpirationClassifier::new(settings.expiration_alert_days),
            clock.clone(),
        );
        let tokens = TokenService::new(&secret, settings.token_ttl_secs, clock.clone());

        info!(
            "Vault ready ({}, alert window {} days)",
            store.backend_name(),
            settings.expiration_alert_days
        );

        Ok(Self {
            store,
            users,
            acessos,
            feed: NotificationFeed::new(),
            tokens,
            clock,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Create the configured bootstrap administrator if it does not exist yet
    pub async fn ensure_admin(&self) -> Result<bool> {
        let Some(admin) = self.settings.bootstrap_admin.to_new_user() else {
            debug!("No bootstrap administrator configured");
            return Ok(false);
        };
        let created = self.users.ensure_admin(admin).await?;
        if created {
            info!("Created bootstrap administrator {}", self.settings.bootstrap_admin.email);
        }
        Ok(created)
    }

    /// Check credentials and start a session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let user = self.users.authenticate(email, password).await?;
        self.tokens.issue(&user)
    }

    /// Resolve a bearer token to the current identity of its user
    ///
    /// The role is read from the store, not from the token.
    pub async fn authenticate_token(&self, token: &str) -> Result<Principal> {
        let claims = self.tokens.validate(token)?;
        let user_id = TokenService::subject(&claims)?;
        Ok(self.users.active_user(user_id).await?.principal())
    }

    pub async fn visible_acessos(&self, requester: &Principal) -> Result<Vec<AcessoView>> {
        self.acessos.list_visible(requester).await
    }

    /// The requester's notifications, newest first
    ///
    /// Refreshes expiration events first. A failed refresh is logged and the
    /// entries already in the feed are returned.
    pub async fn notifications(&self, requester: &Principal) -> Vec<Notification> {
        if let Err(e) = self.refresh_feed(requester).await {
            warn!("Could not refresh notifications for user {}: {}", requester.user_id, e);
        }
        self.feed.list(requester.user_id).await
    }

    pub async fn dismiss_notification(&self, requester: &Principal, id: u64) -> Result<()> {
        if self.feed.dismiss(requester.user_id, id).await {
            Ok(())
        } else {
            Err(VaultError::not_found(format!("Notification not found with id: {}", id)))
        }
    }

    pub async fn clear_notifications(&self, requester: &Principal) {
        self.feed.clear(requester.user_id).await;
    }

    /// Refresh the feed of every active user
    ///
    /// Returns the number of new notifications.
    pub async fn sweep_expirations(&self) -> Result<usize> {
        let mut added = 0;
        for user in self.store.list_users().await? {
            if !user.active {
                continue;
            }
            added += self.refresh_feed(&user.principal()).await?;
        }
        info!("Expiration sweep finished: {} new notifications", added);
        Ok(added)
    }

    async fn refresh_feed(&self, requester: &Principal) -> Result<usize> {
        let events = self.acessos.expiration_events(requester).await?;
        Ok(self
            .feed
            .sync(requester.user_id, &events, self.clock.now())
            .await)
    }
}

/// Derive the secret-sealing key and check it against the stored verification
async fn unlock_cipher(keys: &dyn KeyStore, secret: &[u8]) -> Result<SecretCipher> {
    let salt = match keys.load_salt().await? {
        Some(salt) => salt,
        None => {
            let salt = generate_salt();
            keys.save_salt(&salt).await?;
            salt
        }
    };

    let key = derive_key(secret, &salt, None)?;
    let cipher = SecretCipher::new(&key)?;

    match keys.load_verification().await? {
        Some(sealed) => {
            let matches = cipher
                .open(&sealed)
                .map(|plain| plain.expose() == VERIFICATION_PLAINTEXT)
                .unwrap_or(false);
            if !matches {
                return Err(VaultError::KeyDerivationError(
                    "Token secret does not match the existing data directory".to_string(),
                ));
            }
        }
        None => {
            keys.save_verification(&cipher.seal(VERIFICATION_PLAINTEXT)?).await?;
        }
    }

    Ok(cipher)
}
